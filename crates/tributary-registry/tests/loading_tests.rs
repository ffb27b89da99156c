// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lazy connector loading, caching, and failure reporting.

use std::sync::Arc;
use std::time::Duration;

use tributary_core::types::{EXPRESSION_LEGACY_UID, EXPRESSION_UID};
use tributary_core::{SourceLookup, SourceRef, VariableValue};
use tributary_test_utils::{FactoryOutput, TestHarness};

fn lookup(token: &str) -> SourceLookup {
    SourceLookup::from(token)
}

#[tokio::test]
async fn sequential_gets_return_the_same_instance() {
    let harness = TestHarness::builder().build();
    let first = harness.service.get(Some(&lookup("uidA")), None).await.unwrap();
    let second = harness.service.get(Some(&lookup("uidA")), None).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(harness.constructed("prometheus"), 1);
    assert_eq!(harness.class_loader.loads_of("prometheus"), 1);
}

#[tokio::test]
async fn name_id_and_default_share_the_uid_instance() {
    let harness = TestHarness::builder().build();
    let by_uid = harness.service.get(Some(&lookup("uidA")), None).await.unwrap();

    let by_name = harness.service.get(Some(&lookup("A")), None).await.unwrap();
    let by_id = harness
        .service
        .get(Some(&SourceLookup::from(1_i64)), None)
        .await
        .unwrap();
    let by_default = harness.service.get(None, None).await.unwrap();
    let by_ref = harness
        .service
        .get(Some(&SourceLookup::from(SourceRef::new("prometheus", "uidA"))), None)
        .await
        .unwrap();

    for other in [&by_name, &by_id, &by_default, &by_ref] {
        assert!(Arc::ptr_eq(&by_uid, other));
    }
    assert_eq!(harness.constructed("prometheus"), 1);
}

#[tokio::test]
async fn default_given_by_name_maps_to_its_uid() {
    let harness = TestHarness::builder().with_default("B").build();
    let by_default = harness.service.get(Some(&lookup("default")), None).await.unwrap();
    assert_eq!(by_default.uid(), "uidB");
    assert!(harness.service.generation().cache().contains("uidB"));
}

#[tokio::test]
async fn unset_default_is_not_found() {
    let harness = TestHarness::builder().with_default("").build();
    let err = harness.service.get(None, None).await.unwrap_err();
    assert_eq!(err.to_string(), "default was not found");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn expression_needs_no_class_load() {
    let harness = TestHarness::builder().build();
    let canonical = harness
        .service
        .get(Some(&lookup(EXPRESSION_UID)), None)
        .await
        .unwrap();
    let legacy = harness
        .service
        .get(Some(&lookup(EXPRESSION_LEGACY_UID)), None)
        .await
        .unwrap();
    let structured = harness
        .service
        .get(
            Some(&SourceLookup::from(SourceRef {
                source_type: Some(EXPRESSION_UID.to_string()),
                uid: None,
            })),
            None,
        )
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&canonical, &legacy));
    assert!(Arc::ptr_eq(&canonical, &structured));
    assert_eq!(canonical.uid(), EXPRESSION_UID);
    assert_eq!(harness.class_loader.total_loads(), 0);
}

#[tokio::test]
async fn variable_reference_reresolves_without_disturbing_cache() {
    let harness = TestHarness::builder().build();
    harness.vars.set("var", VariableValue::Single("uidA".into()));

    let a = harness.service.get(Some(&lookup("$var")), None).await.unwrap();
    assert_eq!(a.uid(), "uidA");

    harness.vars.set("var", VariableValue::Single("uidB".into()));
    let b = harness.service.get(Some(&lookup("$var")), None).await.unwrap();
    assert_eq!(b.uid(), "uidB");
    assert!(!Arc::ptr_eq(&a, &b));

    let cache_a = harness.service.generation().cache().get("uidA").unwrap();
    assert!(Arc::ptr_eq(&a, &cache_a));
    assert_eq!(harness.constructed("prometheus"), 1);
    assert_eq!(harness.constructed("graphite"), 1);
}

#[tokio::test]
async fn variable_naming_a_source_loads_by_uid() {
    let harness = TestHarness::builder().build();
    harness.vars.set("var", VariableValue::Single("default".into()));
    let instance = harness.service.get(Some(&lookup("${var}")), None).await.unwrap();
    assert_eq!(instance.uid(), "uidA");
}

#[tokio::test]
async fn concurrent_loads_join_one_class_load() {
    let harness = TestHarness::builder()
        .with_load_delay(Duration::from_millis(20))
        .build();

    let key = lookup("uidA");
    let (first, second) = tokio::join!(
        harness.service.get(Some(&key), None),
        harness.service.get(Some(&key), None),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(harness.class_loader.loads_of("prometheus"), 1);
    assert_eq!(harness.constructed("prometheus"), 1);

    let cache = harness.service.generation();
    let cached = cache.cache().get("uidA").unwrap();
    assert!(Arc::ptr_eq(&cached, &first));
    assert_eq!(cache.cache().in_flight(), 0);
}

#[tokio::test]
async fn abandoned_load_is_resumed_by_the_next_request() {
    let harness = TestHarness::builder()
        .with_load_delay(Duration::from_millis(20))
        .build();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(2),
        harness.service.get(Some(&lookup("uidA")), None),
    )
    .await;
    assert!(abandoned.is_err());

    let instance = harness.service.get(Some(&lookup("uidA")), None).await.unwrap();
    assert_eq!(instance.uid(), "uidA");
    assert_eq!(harness.class_loader.loads_of("prometheus"), 1);
    assert_eq!(harness.constructed("prometheus"), 1);
    assert_eq!(harness.service.generation().cache().in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_loads_across_threads_leave_one_instance() {
    let harness = Arc::new(
        TestHarness::builder()
            .with_load_delay(Duration::from_millis(10))
            .build(),
    );

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let harness = harness.clone();
        tasks.push(tokio::spawn(async move {
            harness.service.get(Some(&lookup("uidB")), None).await
        }));
    }

    let mut instances = Vec::new();
    for task in tasks {
        instances.push(task.await.unwrap().unwrap());
    }

    let cached = harness.service.generation().cache().get("uidB").unwrap();
    for instance in &instances {
        assert!(Arc::ptr_eq(instance, &cached));
    }
    assert_eq!(harness.constructed("graphite"), 1);
}

#[tokio::test]
async fn legacy_classes_are_constructed_through_injection() {
    let harness = TestHarness::builder()
        .with_legacy_plugin("graphite", FactoryOutput::Conforming)
        .build();
    let instance = harness.service.get(Some(&lookup("B")), None).await.unwrap();
    assert_eq!(instance.uid(), "uidB");
    assert_eq!(instance.name(), "B");
    assert_eq!(harness.constructed("graphite"), 1);
}

#[tokio::test]
async fn bare_objects_are_wrapped_with_settings_identity() {
    let harness = TestHarness::builder()
        .with_plugin("graphite", FactoryOutput::Bare)
        .build();
    let instance = harness.service.get(Some(&lookup("uidB")), None).await.unwrap();
    assert_eq!(instance.uid(), "uidB");
    assert_eq!(instance.name(), "B");
    assert_eq!(instance.source_type(), "graphite");
    assert_eq!(instance.id(), Some(2));
    assert_eq!(instance.get_ref(), SourceRef::new("graphite", "uidB"));
}

#[tokio::test]
async fn class_load_failure_is_reported_and_not_cached() {
    let harness = TestHarness::builder()
        .with_failing_plugin("graphite", "bundle 404")
        .build();

    let err = harness.service.get(Some(&lookup("uidB")), None).await.unwrap_err();
    assert_eq!(err.to_string(), "uidB was not found");

    let failures = harness.notifier.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "B");
    assert!(failures[0].1.contains("bundle 404"));
    assert!(!harness.service.generation().cache().contains("uidB"));

    // No negative caching: the next request tries again.
    assert!(harness.service.get(Some(&lookup("uidB")), None).await.is_err());
    assert_eq!(harness.class_loader.loads_of("graphite"), 2);
    assert_eq!(harness.notifier.count(), 2);
}

#[tokio::test]
async fn constructor_failure_is_reported() {
    let harness = TestHarness::builder()
        .with_plugin("graphite", FactoryOutput::Fail)
        .build();
    let err = harness.service.get(Some(&lookup("B")), None).await.unwrap_err();
    assert_eq!(err.to_string(), "uidB was not found");
    assert!(harness.notifier.failures()[0].1.contains("constructor for graphite threw"));
}

#[tokio::test]
async fn unresolved_keys_fail_without_notification() {
    let harness = TestHarness::builder().build();
    let err = harness.service.get(Some(&lookup("nope")), None).await.unwrap_err();
    assert_eq!(err.to_string(), "nope was not found");
    assert_eq!(harness.notifier.count(), 0);
    assert_eq!(harness.class_loader.total_loads(), 0);

    harness.vars.set("var", VariableValue::Single("gone".into()));
    let err = harness.service.get(Some(&lookup("$var")), None).await.unwrap_err();
    assert_eq!(err.to_string(), "gone was not found");
}

#[tokio::test]
async fn plugin_components_are_attached() {
    use tributary_core::LoadedPlugin;
    use tributary_test_utils::TestFactory;

    let harness = TestHarness::builder().build();
    harness.class_loader.register(
        "prometheus",
        LoadedPlugin::modern(Arc::new(TestFactory::new(FactoryOutput::Conforming)))
            .with_components(serde_json::json!({"QueryEditor": "PromQueryEditor"})),
    );
    let instance = harness.service.get(Some(&lookup("uidA")), None).await.unwrap();
    assert_eq!(
        instance.components().and_then(|c| c["QueryEditor"].as_str()),
        Some("PromQueryEditor")
    );
}
