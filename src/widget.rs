use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::dispatch::{dispatch, DispatchReport, InstanceSource, Presenter};
use crate::events::Trigger;
use crate::month::MonthKey;
use crate::nav::{self, Transition};
use crate::render::build;
use crate::resolve::{resolve, Resolution};
use crate::store::{Store, WidgetState};

/// Result of handling one trigger.
#[derive(Debug)]
pub struct Outcome {
    pub shown: MonthKey,
    pub resolution: Resolution,
    pub transition: Option<Transition>,
    pub report: DispatchReport,
}

pub struct Widget<C: Clock> {
    clock: C,
    label_format: String,
}

impl Widget<SystemClock> {
    pub fn from_config(config: &Config) -> Self {
        Widget::new(
            SystemClock::new(config.timezone.clone()),
            &config.label_format,
        )
    }
}

impl<C: Clock> Widget<C> {
    pub fn new(clock: C, label_format: &str) -> Self {
        Widget {
            clock,
            label_format: label_format.to_owned(),
        }
    }

    /// Runs one trigger to completion: navigates if asked to, then redraws
    /// every active instance from freshly read state.
    pub fn handle<S, I, P>(
        &self,
        trigger: Trigger,
        store: &mut S,
        instances: &I,
        presenter: &mut P,
    ) -> Outcome
    where
        S: Store + ?Sized,
        I: InstanceSource + ?Sized,
        P: Presenter + ?Sized,
    {
        let transition = match trigger {
            Trigger::Refresh => None,
            Trigger::Navigate {
                direction,
                instance,
            } => {
                log::debug!("Widget {} requested {}", instance, direction);
                match nav::navigate(&mut *store, &self.clock, direction) {
                    Ok(transition) => Some(transition),
                    Err(err) => {
                        log::warn!("Could not navigate {}: {}", direction, err);
                        None
                    }
                }
            }
        };

        let state = WidgetState::load(&*store, &self.clock);
        let resolution = resolve(&state.current, &state.mapping, state.fallback.as_deref());
        let image = resolution.path();

        let report = dispatch(&instances.active(), presenter, |instance| {
            build(instance, &state.current, image, &self.label_format)
        });

        Outcome {
            shown: state.current,
            resolution,
            transition,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::*;
    use crate::nav::Direction;
    use crate::render::{InstanceId, RenderDescriptor};
    use crate::store::{MemoryStore, CURRENT_MONTH_KEY, FALLBACK_IMAGE_KEY};
    use chrono::NaiveDate;

    #[derive(Default)]
    struct Screen {
        broken: Vec<InstanceId>,
        shown: Vec<(InstanceId, RenderDescriptor)>,
    }

    impl Presenter for Screen {
        fn present(&mut self, instance: InstanceId, descriptor: &RenderDescriptor) -> Result<()> {
            if self.broken.contains(&instance) {
                return Err(Error::new(ErrorKind::Presentation, "decode failed"));
            }
            self.shown.push((instance, descriptor.clone()));
            Ok(())
        }
    }

    fn widget() -> Widget<FixedClock> {
        Widget::new(
            FixedClock(NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()),
            "%Y/%m",
        )
    }

    fn next(instance: u32) -> Trigger {
        Trigger::Navigate {
            direction: Direction::Next,
            instance: InstanceId(instance),
        }
    }

    fn current(store: &MemoryStore) -> Option<String> {
        store.get(CURRENT_MONTH_KEY).unwrap()
    }

    #[test]
    fn blocked_next_keeps_month_with_specific_image() {
        let mut store = MemoryStore::new()
            .with(CURRENT_MONTH_KEY, "2025-03")
            .with(FALLBACK_IMAGE_KEY, "f.png")
            .with_image("2025-03", "a.png");
        let mut screen = Screen::default();

        let outcome = widget().handle(next(1), &mut store, &vec![InstanceId(1)], &mut screen);

        assert!(!outcome.transition.unwrap().committed);
        assert_eq!(outcome.shown.to_string(), "2025-03");
        assert_eq!(outcome.resolution, Resolution::Specific("a.png".to_owned()));
        assert_eq!(current(&store).as_deref(), Some("2025-03"));
        assert_eq!(screen.shown[0].1.image_path.as_deref(), Some("a.png"));
    }

    #[test]
    fn committed_next_shows_new_image() {
        let mut store = MemoryStore::new()
            .with(CURRENT_MONTH_KEY, "2025-03")
            .with_image("2025-03", "a.png")
            .with_image("2025-04", "b.png");
        let mut screen = Screen::default();

        let outcome = widget().handle(next(1), &mut store, &vec![InstanceId(1)], &mut screen);

        assert!(outcome.transition.unwrap().committed);
        assert_eq!(current(&store).as_deref(), Some("2025-04"));
        assert_eq!(outcome.resolution.path(), Some("b.png"));

        let (_, descriptor) = &screen.shown[0];
        assert_eq!(descriptor.label, "2025/04");
        assert_eq!(descriptor.image_path.as_deref(), Some("b.png"));
    }

    #[test]
    fn empty_store_still_renders() {
        let mut store = MemoryStore::new();
        let mut screen = Screen::default();

        let outcome = widget().handle(
            Trigger::Refresh,
            &mut store,
            &vec![InstanceId(1)],
            &mut screen,
        );

        assert_eq!(outcome.resolution, Resolution::Missing);
        let (_, descriptor) = &screen.shown[0];
        assert_eq!(descriptor.label, "2025/03");
        assert_eq!(descriptor.image_path, None);
        assert_eq!(descriptor.controls.prev.to_string(), "nav:prev:1");
        assert_eq!(descriptor.controls.next.to_string(), "nav:next:1");
        assert_eq!(current(&store), None);
    }

    #[test]
    fn refresh_does_not_rewrite_corrupt_month() {
        let mut store = MemoryStore::new()
            .with(CURRENT_MONTH_KEY, "2025-3")
            .with(FALLBACK_IMAGE_KEY, "f.png");
        let mut screen = Screen::default();

        let outcome = widget().handle(
            Trigger::Refresh,
            &mut store,
            &vec![InstanceId(1)],
            &mut screen,
        );

        assert_eq!(outcome.shown.to_string(), "2025-03");
        assert_eq!(outcome.resolution, Resolution::Fallback("f.png".to_owned()));
        assert_eq!(current(&store).as_deref(), Some("2025-3"));
    }

    #[test]
    fn one_broken_instance_does_not_stop_others() {
        let mut store = MemoryStore::new().with_image("2025-03", "a.png");
        let mut screen = Screen {
            broken: vec![InstanceId(2)],
            ..Screen::default()
        };
        let instances = vec![InstanceId(1), InstanceId(2), InstanceId(3)];

        let outcome = widget().handle(Trigger::Refresh, &mut store, &instances, &mut screen);

        assert_eq!(outcome.report.presented, vec![InstanceId(1), InstanceId(3)]);
        assert_eq!(outcome.report.failed.len(), 1);
        let shown: Vec<_> = screen.shown.iter().map(|(id, _)| *id).collect();
        assert_eq!(shown, vec![InstanceId(1), InstanceId(3)]);
    }

    #[test]
    fn tap_on_any_instance_moves_all() {
        let mut store = MemoryStore::new()
            .with_image("2025-03", "a.png")
            .with_image("2025-04", "b.png");
        let mut screen = Screen::default();
        let instances = vec![InstanceId(1), InstanceId(2)];

        widget().handle(next(2), &mut store, &instances, &mut screen);

        assert!(screen
            .shown
            .iter()
            .all(|(_, descriptor)| descriptor.label == "2025/04"));
    }
}
