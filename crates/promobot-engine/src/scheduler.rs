//! The scheduler service owning the robot's single recurring trigger.
//!
//! Holds a [`JobScheduler`] with at most one registered trigger at any
//! time. Reconfiguration is wholesale: validate the new configuration,
//! remove the old trigger, install a new one bound to a fresh snapshot of
//! the configuration. Partial trigger mutation is deliberately not
//! supported, so two live triggers can never coexist.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, LocalResult, TimeZone, Utc};
use chrono_tz::Tz;
use promobot_core::PromotionConfig;
use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

use crate::job::PromotionJob;

/// Interval used when the configuration names no fixed wall-clock time.
const FALLBACK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid timezone {0:?} (expected an IANA zone name)")]
    InvalidTimezone(String),

    #[error("invalid time of day {0:?} (expected HH:MM)")]
    InvalidTimeOfDay(String),

    #[error("scheduler has been shut down")]
    ShutDown,

    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

/// What the scheduler arms for a configuration: a timezone-aware daily
/// fire time, or a fixed interval when no time was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSpec {
    Daily { hour: u32, minute: u32, tz: Tz },
    Every { interval: Duration, tz: Tz },
}

impl TriggerSpec {
    /// Computes the trigger a configuration asks for, validating the
    /// timezone and time-of-day before anything is armed.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::InvalidTimezone`] — the timezone is not a known
    ///   IANA zone name.
    /// - [`ScheduleError::InvalidTimeOfDay`] — `time_of_day` is non-empty
    ///   but not a valid `HH:MM` wall-clock time.
    pub fn from_config(config: &PromotionConfig) -> Result<Self, ScheduleError> {
        let tz: Tz = config
            .timezone
            .parse()
            .map_err(|_| ScheduleError::InvalidTimezone(config.timezone.clone()))?;

        if config.time_of_day.trim().is_empty() {
            return Ok(TriggerSpec::Every {
                interval: FALLBACK_INTERVAL,
                tz,
            });
        }

        let (hour, minute) = config
            .time_of_day_parts()
            .ok_or_else(|| ScheduleError::InvalidTimeOfDay(config.time_of_day.clone()))?;

        Ok(TriggerSpec::Daily { hour, minute, tz })
    }

    fn tz(self) -> Tz {
        match self {
            TriggerSpec::Daily { tz, .. } | TriggerSpec::Every { tz, .. } => tz,
        }
    }
}

/// Operator-facing scheduler state.
#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    pub active: bool,
    /// Next fire time in the configured timezone; `None` while idle.
    pub next_run: Option<DateTime<Tz>>,
}

struct ActiveTrigger {
    id: Uuid,
    tz: Tz,
}

/// Injectable scheduler service with an explicit lifecycle.
///
/// States: Idle (no trigger registered) and Armed (exactly one trigger).
/// The background clock lives for the lifetime of this value and is
/// released by [`RobotScheduler::shutdown`], which the host calls at
/// process teardown on every exit path.
pub struct RobotScheduler {
    inner: JobScheduler,
    job: Arc<PromotionJob>,
    current: Option<ActiveTrigger>,
    shut_down: bool,
}

impl RobotScheduler {
    /// Creates the scheduler and starts its background clock, in Idle state.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Scheduler`] if the underlying scheduler
    /// cannot be initialised or started.
    pub async fn start(job: Arc<PromotionJob>) -> Result<Self, ScheduleError> {
        let inner = JobScheduler::new().await?;
        inner.start().await?;
        Ok(Self {
            inner,
            job,
            current: None,
            shut_down: false,
        })
    }

    /// Replaces the registered trigger with one for `config`, atomically.
    ///
    /// The new configuration is validated before the existing trigger is
    /// touched, and the swap is serialized against in-flight runs so a run
    /// never observes a half-replaced configuration. Re-registration
    /// happens even when the new configuration equals the old one: the
    /// bound snapshot is replaced wholesale.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::InvalidTimezone`] / [`ScheduleError::InvalidTimeOfDay`] —
    ///   rejected before any trigger change.
    /// - [`ScheduleError::ShutDown`] — the clock was already stopped.
    /// - [`ScheduleError::Scheduler`] — the underlying scheduler failed.
    pub async fn reconfigure(&mut self, config: PromotionConfig) -> Result<(), ScheduleError> {
        if self.shut_down {
            return Err(ScheduleError::ShutDown);
        }
        let spec = TriggerSpec::from_config(&config)?;

        let run_lock = self.job.run_lock();
        let _guard = run_lock.lock().await;

        if let Some(previous) = self.current.take() {
            self.inner.remove(&previous.id).await?;
        }

        let tz = spec.tz();
        let trigger = build_trigger(spec, Arc::clone(&self.job), Arc::new(config))?;
        let id = self.inner.add(trigger).await?;
        self.current = Some(ActiveTrigger { id, tz });

        tracing::info!(?spec, "scheduler: trigger registered");
        Ok(())
    }

    /// Reports whether a trigger is armed and, if so, when it fires next
    /// (in the configured timezone).
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Scheduler`] if the underlying scheduler
    /// cannot compute the next tick.
    pub async fn status(&mut self) -> Result<SchedulerStatus, ScheduleError> {
        let Some((id, tz)) = self.current.as_ref().map(|a| (a.id, a.tz)) else {
            return Ok(SchedulerStatus {
                active: false,
                next_run: None,
            });
        };

        let next_utc = self.inner.next_tick_for_job(id).await?;
        Ok(SchedulerStatus {
            active: true,
            next_run: next_utc.map(|t| t.with_timezone(&tz)),
        })
    }

    /// Stops the background clock. Prevents any future run from starting;
    /// a run already executing completes its batch. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Scheduler`] if the underlying scheduler
    /// fails to stop; the service is still marked shut down.
    pub async fn shutdown(&mut self) -> Result<(), ScheduleError> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;
        self.current = None;
        self.inner.shutdown().await?;
        tracing::info!("scheduler: background clock stopped");
        Ok(())
    }
}

fn build_trigger(
    spec: TriggerSpec,
    job: Arc<PromotionJob>,
    config: Arc<PromotionConfig>,
) -> Result<Job, ScheduleError> {
    match spec {
        TriggerSpec::Daily { hour, minute, tz } => {
            let line = format!("0 {minute} {hour} * * *");
            let trigger = Job::new_async_tz(line.as_str(), tz, move |_id, _scheduler| {
                let job = Arc::clone(&job);
                let config = Arc::clone(&config);
                Box::pin(async move {
                    run_and_log(&job, &config).await;
                })
            })?;
            Ok(trigger)
        }
        TriggerSpec::Every { interval, .. } => {
            let trigger = Job::new_repeated_async(interval, move |_id, _scheduler| {
                let job = Arc::clone(&job);
                let config = Arc::clone(&config);
                Box::pin(async move {
                    run_and_log(&job, &config).await;
                })
            })?;
            Ok(trigger)
        }
    }
}

async fn run_and_log(job: &PromotionJob, config: &PromotionConfig) {
    tracing::info!(platform = %config.platform, "scheduler: starting promotion run");
    let outcome = job.run(config).await;
    tracing::info!(?outcome, "scheduler: promotion run complete");
}

/// Next occurrence of a daily `hour:minute` wall-clock time in `tz`,
/// strictly after `now`.
///
/// DST shifts are handled the way a wall clock is read: an ambiguous time
/// resolves to its earlier instant, and a time skipped by a forward jump
/// rolls over to the next day.
#[must_use]
pub fn next_daily_occurrence(
    hour: u32,
    minute: u32,
    tz: Tz,
    now: DateTime<Utc>,
) -> Option<DateTime<Tz>> {
    let now_local = now.with_timezone(&tz);
    let mut date = now_local.date_naive();

    // Today, tomorrow, and one spare day for a DST gap on the boundary.
    for _ in 0..3 {
        let candidate =
            match tz.with_ymd_and_hms(date.year(), date.month(), date.day(), hour, minute, 0) {
                LocalResult::Single(dt) => Some(dt),
                LocalResult::Ambiguous(earlier, _) => Some(earlier),
                LocalResult::None => None,
            };
        if let Some(dt) = candidate {
            if dt > now_local {
                return Some(dt);
            }
        }
        date = date.succ_opt()?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().expect("valid RFC 3339 timestamp")
    }

    #[test]
    fn next_occurrence_is_later_today_when_the_time_is_ahead() {
        let tz: Tz = "Europe/Madrid".parse().expect("valid zone");
        // 07:00 UTC = 09:00 CEST; 10:00 local is still ahead.
        let next = next_daily_occurrence(10, 0, tz, utc("2026-07-15T07:00:00Z"))
            .expect("should find an occurrence");
        assert_eq!((next.hour(), next.minute()), (10, 0));
        assert_eq!(next.date_naive().to_string(), "2026-07-15");
        // 10:00 CEST is 08:00 UTC.
        assert_eq!(next.with_timezone(&Utc), utc("2026-07-15T08:00:00Z"));
    }

    #[test]
    fn next_occurrence_rolls_to_tomorrow_when_the_time_has_passed() {
        let tz: Tz = "Europe/Madrid".parse().expect("valid zone");
        // 09:30 UTC = 11:30 CEST; 10:00 local already passed today.
        let next = next_daily_occurrence(10, 0, tz, utc("2026-07-15T09:30:00Z"))
            .expect("should find an occurrence");
        assert_eq!(next.date_naive().to_string(), "2026-07-16");
        assert_eq!((next.hour(), next.minute()), (10, 0));
    }

    #[test]
    fn next_occurrence_skips_a_dst_gap() {
        let tz: Tz = "Europe/Madrid".parse().expect("valid zone");
        // Spain springs forward on 2026-03-29: 02:30 local does not exist
        // that day. From midday on the 28th, today's 02:30 has passed and
        // the 29th is a gap, so the next occurrence lands on the 30th.
        let next = next_daily_occurrence(2, 30, tz, utc("2026-03-28T12:00:00Z"))
            .expect("should find an occurrence");
        assert_eq!(next.date_naive().to_string(), "2026-03-30");
        assert_eq!((next.hour(), next.minute()), (2, 30));
    }

    #[test]
    fn trigger_spec_rejects_unknown_timezone() {
        let config = PromotionConfig {
            timezone: "Mars/Olympus".to_string(),
            ..PromotionConfig::default()
        };
        assert!(matches!(
            TriggerSpec::from_config(&config),
            Err(ScheduleError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn trigger_spec_rejects_malformed_time() {
        let config = PromotionConfig {
            time_of_day: "25:99".to_string(),
            ..PromotionConfig::default()
        };
        assert!(matches!(
            TriggerSpec::from_config(&config),
            Err(ScheduleError::InvalidTimeOfDay(_))
        ));
    }

    #[test]
    fn trigger_spec_parses_daily_time_in_zone() {
        let spec = TriggerSpec::from_config(&PromotionConfig::default()).expect("valid config");
        let madrid: Tz = "Europe/Madrid".parse().expect("valid zone");
        assert_eq!(
            spec,
            TriggerSpec::Daily {
                hour: 10,
                minute: 0,
                tz: madrid
            }
        );
    }

    #[test]
    fn trigger_spec_falls_back_to_interval_without_a_time() {
        let config = PromotionConfig {
            time_of_day: String::new(),
            ..PromotionConfig::default()
        };
        let spec = TriggerSpec::from_config(&config).expect("valid config");
        assert!(matches!(spec, TriggerSpec::Every { .. }));
    }
}
