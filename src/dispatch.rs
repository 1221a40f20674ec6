use itertools::Itertools;

use crate::error::*;
use crate::render::{InstanceId, RenderDescriptor};

/// Draws a descriptor onto one widget instance.
pub trait Presenter {
    fn present(&mut self, instance: InstanceId, descriptor: &RenderDescriptor) -> Result<()>;
}

/// The widget instances that are currently placed.
pub trait InstanceSource {
    fn active(&self) -> Vec<InstanceId>;
}

impl InstanceSource for [InstanceId] {
    fn active(&self) -> Vec<InstanceId> {
        self.to_vec()
    }
}

impl InstanceSource for Vec<InstanceId> {
    fn active(&self) -> Vec<InstanceId> {
        self.clone()
    }
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub presented: Vec<InstanceId>,
    pub failed: Vec<(InstanceId, Error)>,
}

impl DispatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Presents one descriptor per instance. A failing instance is recorded and
/// skipped; the remaining instances are still presented.
pub fn dispatch<P, F>(instances: &[InstanceId], presenter: &mut P, mut produce: F) -> DispatchReport
where
    P: Presenter + ?Sized,
    F: FnMut(InstanceId) -> RenderDescriptor,
{
    let mut report = DispatchReport::default();

    for &instance in instances {
        let descriptor = produce(instance);
        match presenter.present(instance, &descriptor) {
            Ok(()) => report.presented.push(instance),
            Err(err) => {
                log::warn!("Could not present widget {}: {}", instance, err);
                report.failed.push((instance, err));
            }
        }
    }

    if !report.is_complete() {
        log::warn!(
            "{} of {} widgets not updated: {}",
            report.failed.len(),
            instances.len(),
            report.failed.iter().map(|(id, _)| id).join(", ")
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::month::MonthKey;
    use crate::render::build;

    #[derive(Default)]
    struct Recorder {
        failing: Vec<InstanceId>,
        shown: Vec<(InstanceId, RenderDescriptor)>,
    }

    impl Presenter for Recorder {
        fn present(&mut self, instance: InstanceId, descriptor: &RenderDescriptor) -> Result<()> {
            if self.failing.contains(&instance) {
                return Err(Error::new(ErrorKind::Presentation, "cannot decode image"));
            }
            self.shown.push((instance, descriptor.clone()));
            Ok(())
        }
    }

    #[test]
    fn failure_is_isolated() {
        let month: MonthKey = "2025-03".parse().unwrap();
        let instances = vec![InstanceId(1), InstanceId(2), InstanceId(3)];
        let mut recorder = Recorder {
            failing: vec![InstanceId(2)],
            ..Recorder::default()
        };

        let report = dispatch(&instances.active(), &mut recorder, |id| {
            build(id, &month, Some("a.png"), "%Y/%m")
        });

        assert_eq!(report.presented, vec![InstanceId(1), InstanceId(3)]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, InstanceId(2));
        assert!(!report.is_complete());

        let shown: Vec<_> = recorder.shown.iter().map(|(id, _)| *id).collect();
        assert_eq!(shown, vec![InstanceId(1), InstanceId(3)]);
        assert_eq!(
            recorder.shown[1].1.controls.next.to_string(),
            "nav:next:3"
        );
    }

    #[test]
    fn no_instances() {
        let mut recorder = Recorder::default();
        let report = dispatch(&[], &mut recorder, |_| unreachable!());
        assert!(report.is_complete());
        assert!(report.presented.is_empty());
    }
}
