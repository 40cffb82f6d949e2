/*!
 * Tests for limits, checkpoint groups, engine reloads and failure isolation
 */

use anyhow::Result;

use l10n_fill::app_config::Config;
use l10n_fill::engine::{Engine, MockEngine};
use l10n_fill::translation::Glossary;
use l10n_fill::{Controller, LocalizationDataset};
use crate::common;

const THREE_KEYS: &str = r#"{
    "f.php": {
        "K1": {"en": "Save", "tr": null},
        "K2": {"en": "Open", "tr": null},
        "K3": {"en": "Close", "tr": null}
    }
}"#;

const TWO_FILES: &str = r#"{
    "a.php": {"K1": {"en": "Save", "tr": null}},
    "b.php": {"K2": {"en": "Open", "tr": null}}
}"#;

fn controller(configure: impl FnOnce(&mut Config)) -> Controller {
    let mut config = common::test_config(&["en"], &["tr"]);
    configure(&mut config);
    Controller::with_glossary(config, Glossary::new()).with_progress(false)
}

#[tokio::test]
async fn test_run_withLimit_shouldStopAfterLimit() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.json");
    let mut dataset = LocalizationDataset::from_json_str(THREE_KEYS)?;
    let mut engine = Engine::loaded(MockEngine::echo()).await?;

    let summary = controller(|c| c.batch.limit = 2)
        .run_dataset(&mut dataset, &output, &mut engine)
        .await?;

    assert_eq!(summary.applied, 2);
    assert_eq!(dataset.text("f.php", "K1", "tr"), Some("Save"));
    assert_eq!(dataset.text("f.php", "K2", "tr"), Some("Open"));
    assert_eq!(dataset.text("f.php", "K3", "tr"), None);
    // Only the tasks within the limit reach the engine
    let sent: usize = engine.inner().calls().iter().map(|c| c.texts.len()).sum();
    assert_eq!(sent, 2);
    assert_eq!(LocalizationDataset::load(&output)?, dataset);
    Ok(())
}

#[tokio::test]
async fn test_run_withLimitAndFileGroups_shouldSkipLaterGroups() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.json");
    let mut dataset = LocalizationDataset::from_json_str(TWO_FILES)?;
    let mut engine = Engine::loaded(MockEngine::echo()).await?;

    let summary = controller(|c| {
        c.batch.limit = 1;
        c.batch.file_batch_size = 1;
    })
    .run_dataset(&mut dataset, &output, &mut engine)
    .await?;

    let persisted = LocalizationDataset::load(&output)?;
    assert_eq!(summary.applied, 1);
    assert_eq!(persisted.text("a.php", "K1", "tr"), Some("Save"));
    assert_eq!(persisted.text("b.php", "K2", "tr"), None);
    assert_eq!(engine.inner().call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_withFileGroups_shouldTranslateEachGroupSeparately() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.json");
    let mut dataset = LocalizationDataset::from_json_str(TWO_FILES)?;
    let mut engine = Engine::loaded(MockEngine::echo()).await?;

    let summary = controller(|c| c.batch.file_batch_size = 1)
        .run_dataset(&mut dataset, &output, &mut engine)
        .await?;

    assert_eq!(summary.applied, 2);
    assert_eq!(summary.tasks, 2);
    // One engine call per file group
    assert_eq!(engine.inner().call_count(), 2);
    let persisted = LocalizationDataset::load(&output)?;
    assert_eq!(persisted.text("b.php", "K2", "tr"), Some("Open"));
    Ok(())
}

#[tokio::test]
async fn test_run_withReloadInterval_shouldReloadOnBoundaries() -> Result<()> {
    common::init_logger();
    let dir = common::create_temp_dir()?;
    let mut dataset = LocalizationDataset::from_json_str(THREE_KEYS)?;
    let mut engine = Engine::loaded(MockEngine::echo()).await?;

    let summary = controller(|c| {
        c.batch.batch_size = 1;
        c.batch.reload_after = 1;
    })
    .run_dataset(&mut dataset, &dir.path().join("out.json"), &mut engine)
    .await?;

    assert_eq!(summary.reloads, 3);
    assert_eq!(engine.reload_count(), 3);
    assert_eq!(engine.inner().load_count(), 1 + summary.reloads);
    assert_eq!(engine.inner().unload_count(), summary.reloads);
    assert!(engine.is_loaded());
    assert_eq!(summary.applied, 3);
    Ok(())
}

#[tokio::test]
async fn test_run_withReloadIntervalOfTwo_shouldReloadOnce() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut dataset = LocalizationDataset::from_json_str(THREE_KEYS)?;
    let mut engine = Engine::loaded(MockEngine::echo()).await?;

    let summary = controller(|c| {
        c.batch.batch_size = 1;
        c.batch.reload_after = 2;
    })
    .run_dataset(&mut dataset, &dir.path().join("out.json"), &mut engine)
    .await?;

    assert_eq!(summary.reloads, 1);
    Ok(())
}

#[tokio::test]
async fn test_run_withIntermittentEngine_shouldOnlyLoseFailedSubBatch() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut dataset = LocalizationDataset::from_json_str(THREE_KEYS)?;
    let mut engine = Engine::loaded(MockEngine::intermittent(2)).await?;

    let summary = controller(|c| c.batch.batch_size = 1)
        .run_dataset(&mut dataset, &dir.path().join("out.json"), &mut engine)
        .await?;

    assert_eq!(summary.failed_sub_batches, 1);
    assert_eq!(summary.applied, 2);
    assert_eq!(dataset.text("f.php", "K1", "tr"), Some("Save"));
    assert_eq!(dataset.text("f.php", "K2", "tr"), None);
    assert_eq!(dataset.text("f.php", "K3", "tr"), Some("Close"));
    Ok(())
}

#[tokio::test]
async fn test_run_withFailedSubBatch_shouldNotCountTowardReload() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut dataset = LocalizationDataset::from_json_str(THREE_KEYS)?;
    let mut engine = Engine::loaded(MockEngine::intermittent(2)).await?;

    let summary = controller(|c| {
        c.batch.batch_size = 1;
        c.batch.reload_after = 2;
    })
    .run_dataset(&mut dataset, &dir.path().join("out.json"), &mut engine)
    .await?;

    // Calls 1 and 3 succeed, so the second success lands on the boundary
    assert_eq!(summary.failed_sub_batches, 1);
    assert_eq!(summary.reloads, 1);
    Ok(())
}

#[tokio::test]
async fn test_run_withReloadIntervalSpanningFileGroups_shouldKeepCounting() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut dataset = LocalizationDataset::from_json_str(TWO_FILES)?;
    let mut engine = Engine::loaded(MockEngine::echo()).await?;

    let summary = controller(|c| {
        c.batch.batch_size = 1;
        c.batch.file_batch_size = 1;
        c.batch.reload_after = 2;
    })
    .run_dataset(&mut dataset, &dir.path().join("out.json"), &mut engine)
    .await?;

    // One success per group; the second lands on the boundary
    assert_eq!(summary.applied, 2);
    assert_eq!(summary.reloads, 1);
    assert_eq!(engine.reload_count(), 1);
    Ok(())
}
