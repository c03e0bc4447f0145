mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clforge::error::EngineError;
use clforge::geometry::WorkGeometry;
use clforge::key::ConfigKey;
use clforge_ocl::registry::{KernelHandle, KernelPlan, KernelRegistry};

use support::StubQueue;

fn plan(name: &str) -> KernelPlan<String> {
    KernelPlan::SingleFused(KernelHandle {
        kernel: name.to_string(),
        geometry: WorkGeometry::linear(256, 256),
        ordinal: 0,
    })
}

fn key(tag: &str) -> ConfigKey {
    ConfigKey::builder("lite").field("case", tag).finish()
}

#[test]
fn second_lookup_reuses_the_first_build() {
    let registry: KernelRegistry<StubQueue> = KernelRegistry::new();
    let builds = AtomicUsize::new(0);

    let build = || {
        builds.fetch_add(1, Ordering::SeqCst);
        Ok(plan("k"))
    };
    let first = registry.get_or_build("op", &key("a"), build).unwrap();
    let second = registry
        .get_or_build("op", &key("a"), || {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(plan("k"))
        })
        .unwrap();

    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);
}

#[test]
fn same_key_under_different_operations_builds_twice() {
    let registry: KernelRegistry<StubQueue> = KernelRegistry::new();
    registry.get_or_build("fwd", &key("a"), || Ok(plan("f"))).unwrap();
    registry.get_or_build("bwd", &key("a"), || Ok(plan("b"))).unwrap();
    assert_eq!(registry.len(), 2);
}

#[test]
fn concurrent_misses_for_one_key_build_exactly_once() {
    let registry: KernelRegistry<StubQueue> = KernelRegistry::new();
    let builds = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                registry
                    .get_or_build("op", &key("shared"), || {
                        builds.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(5));
                        Ok(plan("k"))
                    })
                    .unwrap();
            });
        }
    });

    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn failed_build_registers_nothing() {
    let registry: KernelRegistry<StubQueue> = KernelRegistry::new();

    let result = registry.get_or_build("op", &key("a"), || {
        Err(EngineError::build("no binary for target"))
    });
    assert!(result.is_err());
    assert!(registry.is_empty());
    assert!(registry.get("op", &key("a")).unwrap().is_none());

    // A later attempt with a working builder succeeds and caches.
    registry.get_or_build("op", &key("a"), || Ok(plan("k"))).unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn clear_drops_every_plan() {
    let registry: KernelRegistry<StubQueue> = KernelRegistry::new();
    registry.get_or_build("op", &key("a"), || Ok(plan("k"))).unwrap();
    registry.get_or_build("op", &key("b"), || Ok(plan("k"))).unwrap();
    assert_eq!(registry.len(), 2);

    registry.clear().unwrap();
    assert!(registry.is_empty());
    assert!(registry.get("op", &key("a")).unwrap().is_none());
}

#[test]
fn plan_cardinality_is_checked_at_assembly() {
    assert!(matches!(
        KernelPlan::<String>::from_stages(vec![]),
        Err(EngineError::PlanCardinality { count: 0 })
    ));

    let three: Vec<_> = (0..3)
        .map(|ordinal| KernelHandle {
            kernel: "k".to_string(),
            geometry: WorkGeometry::linear(256, 256),
            ordinal,
        })
        .collect();
    assert!(matches!(
        KernelPlan::from_stages(three),
        Err(EngineError::PlanCardinality { count: 3 })
    ));

    let two: Vec<_> = (0..2)
        .map(|ordinal| KernelHandle {
            kernel: "k".to_string(),
            geometry: WorkGeometry::linear(256, 256),
            ordinal,
        })
        .collect();
    assert_eq!(KernelPlan::from_stages(two).unwrap().kernel_count(), 2);
}
