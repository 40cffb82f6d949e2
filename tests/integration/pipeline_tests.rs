/*!
 * End-to-end tests: dataset file in, filled dataset file out
 */

use anyhow::Result;

use l10n_fill::engine::mock::MockRequest;
use l10n_fill::engine::{Engine, MockEngine};
use l10n_fill::translation::Glossary;
use l10n_fill::{Controller, LocalizationDataset};
use crate::common;

/// Ukrainian output that differs by source language
fn ukrainian_by_source(request: &MockRequest) -> Option<String> {
    match request.source_language.as_str() {
        "ru" => Some("Зберегти".to_string()),
        _ => Some("Зберегти файл".to_string()),
    }
}

fn controller(sources: &[&str], targets: &[&str]) -> Controller {
    Controller::with_glossary(common::test_config(sources, targets), Glossary::new()).with_progress(false)
}

#[tokio::test]
async fn test_run_withMacroPlaceholder_shouldWriteRestoredTranslation() -> Result<()> {
    common::init_logger();
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        dir.path(),
        "lang.json",
        r#"{"f.php": {"K1": {"en": "Hello #NAME#", "ru": null}}}"#,
    )?;
    let output = dir.path().join("out.json");
    let mut engine = Engine::loaded(MockEngine::with_generator(common::hello_to_russian)).await?;

    let summary = controller(&["en"], &["ru"]).run(&input, &output, &mut engine).await?;

    let result = LocalizationDataset::load(&output)?;
    assert_eq!(result.text("f.php", "K1", "ru"), Some("Привет #NAME#"));
    assert_eq!(result.text("f.php", "K1", "en"), Some("Hello #NAME#"));
    assert_eq!(summary.tasks, 1);
    assert_eq!(summary.applied, 1);
    // The engine never saw the raw macro
    assert!(engine.inner().calls().iter().all(|c| c.texts.iter().all(|t| !t.contains('#'))));
    Ok(())
}

#[tokio::test]
async fn test_run_withOutputDirectory_shouldKeepInputFileName() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(dir.path(), "lang.json", r#"{"f.php": {"K1": {"en": "Save", "tr": null}}}"#)?;
    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir)?;
    let mut engine = Engine::loaded(MockEngine::echo()).await?;

    controller(&["en"], &["tr"]).run(&input, &out_dir, &mut engine).await?;

    let result = LocalizationDataset::load(out_dir.join("lang.json"))?;
    assert_eq!(result.text("f.php", "K1", "tr"), Some("Save"));
    Ok(())
}

#[tokio::test]
async fn test_run_withUkrainianTarget_shouldPreferRussianSource() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        dir.path(),
        "lang.json",
        r#"{"f.php": {"K1": {"en": "Save", "ru": "Сохранить", "ua": null}}}"#,
    )?;
    let output = dir.path().join("out.json");
    let mut engine = Engine::loaded(MockEngine::with_generator(ukrainian_by_source)).await?;

    let summary = controller(&["en", "ru"], &["ua"]).run(&input, &output, &mut engine).await?;

    let result = LocalizationDataset::load(&output)?;
    assert_eq!(result.text("f.php", "K1", "ua"), Some("Зберегти"));
    assert_eq!(summary.queued, 2);
    Ok(())
}

#[tokio::test]
async fn test_run_withLatinOutputForCyrillicTarget_shouldLeaveKeyUnset() -> Result<()> {
    let mut dataset = LocalizationDataset::from_json_str(r#"{"f.php": {"K1": {"en": "Save", "ru": null}}}"#)?;
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.json");
    let mut engine = Engine::loaded(MockEngine::echo()).await?;

    let summary = controller(&["en"], &["ru"]).run_dataset(&mut dataset, &output, &mut engine).await?;

    assert_eq!(summary.applied, 0);
    assert_eq!(dataset.text("f.php", "K1", "ru"), None);
    assert!(output.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withPlaceholdersAlwaysLost_shouldLeaveKeyUnset() -> Result<()> {
    let mut dataset = LocalizationDataset::from_json_str(
        r#"{"f.php": {"K1": {"en": "Hello {name}", "tr": null}, "K2": {"en": "Open", "tr": null}}}"#,
    )?;
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.json");
    let mut engine = Engine::loaded(MockEngine::dropping_placeholders()).await?;

    let summary = controller(&["en"], &["tr"]).run_dataset(&mut dataset, &output, &mut engine).await?;

    assert_eq!(dataset.text("f.php", "K1", "tr"), None);
    assert_eq!(dataset.text("f.php", "K2", "tr"), Some("Open"));
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.failed_sub_batches, 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withAbsentOutput_shouldLeaveKeyUnset() -> Result<()> {
    let mut dataset = LocalizationDataset::from_json_str(r#"{"f.php": {"K1": {"en": "Open", "tr": null}}}"#)?;
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.json");
    let mut engine = Engine::loaded(MockEngine::absent()).await?;

    let summary = controller(&["en"], &["tr"]).run_dataset(&mut dataset, &output, &mut engine).await?;

    assert_eq!(summary.applied, 0);
    assert_eq!(dataset.text("f.php", "K1", "tr"), None);
    Ok(())
}

#[tokio::test]
async fn test_run_withGlossaryHit_shouldBypassEngine() -> Result<()> {
    let mut dataset = LocalizationDataset::from_json_str(r#"{"f.php": {"K1": {"en": "Save", "tr": null}}}"#)?;
    let dir = common::create_temp_dir()?;
    let glossary_path = common::create_test_file(dir.path(), "glossary.json", r#"{"Save": {"tr": "Kaydet"}}"#)?;
    let mut config = common::test_config(&["en"], &["tr"]);
    config.glossary_path = glossary_path.display().to_string();
    let controller = Controller::with_config(config)?.with_progress(false);
    let mut engine = Engine::loaded(MockEngine::failing()).await?;

    let summary = controller
        .run_dataset(&mut dataset, &dir.path().join("out.json"), &mut engine)
        .await?;

    assert_eq!(dataset.text("f.php", "K1", "tr"), Some("Kaydet"));
    assert_eq!(summary.failed_sub_batches, 0);
    assert_eq!(engine.inner().call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withNothingMissing_shouldStillWriteOutput() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let content = r#"{"f.php": {"K1": {"en": "Save", "tr": "Kaydet"}}}"#;
    let input = common::create_test_file(dir.path(), "lang.json", content)?;
    let output = dir.path().join("out.json");
    let mut engine = Engine::loaded(MockEngine::echo()).await?;

    let summary = controller(&["en"], &["tr"]).run(&input, &output, &mut engine).await?;

    assert_eq!(summary.tasks, 0);
    assert_eq!(engine.inner().call_count(), 0);
    assert_eq!(LocalizationDataset::load(&output)?, LocalizationDataset::from_json_str(content)?);
    Ok(())
}

#[tokio::test]
async fn test_run_withMalformedInput_shouldFailBeforeCallingEngine() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(dir.path(), "lang.json", r#"["not", "a", "dataset"]"#)?;
    let output = dir.path().join("out.json");
    let mut engine = Engine::loaded(MockEngine::echo()).await?;

    let result = controller(&["en"], &["tr"]).run(&input, &output, &mut engine).await;

    assert!(result.is_err());
    assert!(!output.exists());
    assert_eq!(engine.inner().call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withoutPreferredSource_shouldFallBackToPrimary() -> Result<()> {
    let mut dataset = LocalizationDataset::from_json_str(
        r#"{"f.php": {"K1": {"en": "Save", "ru": "Сохранить", "cn": null}}}"#,
    )?;
    let dir = common::create_temp_dir()?;
    let mut engine = Engine::loaded(MockEngine::with_generator(common::tag_with_source)).await?;

    controller(&["ru", "en"], &["cn"])
        .run_dataset(&mut dataset, &dir.path().join("out.json"), &mut engine)
        .await?;

    // No proximity entry for "cn"; the first configured source wins
    assert_eq!(dataset.text("f.php", "K1", "cn"), Some("ru Сохранить"));
    Ok(())
}

#[tokio::test]
async fn test_run_withTokenShapedTextBeforeMacro_shouldWriteSourceBack() -> Result<()> {
    let mut dataset = LocalizationDataset::from_json_str(r#"{"f.php": {"K1": {"en": "__PH_1#A#", "tr": null}}}"#)?;
    let dir = common::create_temp_dir()?;
    let mut engine = Engine::loaded(MockEngine::echo()).await?;

    let summary = controller(&["en"], &["tr"])
        .run_dataset(&mut dataset, &dir.path().join("out.json"), &mut engine)
        .await?;

    assert_eq!(summary.applied, 1);
    assert_eq!(dataset.text("f.php", "K1", "tr"), Some("__PH_1#A#"));
    Ok(())
}
