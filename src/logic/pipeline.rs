//! Pipeline - generate → split → scale → encode → build → train → evaluate → save
//!
//! `verify_saved` reloads the written directory and checks it against the rule.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::constants::HIDDEN_UNITS;
use super::config::PipelineConfig;
use super::dataset::{self, Dataset, RiskLabel};
use super::error::{PipelineError, PipelineResult};
use super::features::{Sample, FEATURE_COUNT};
use super::model::{
    self, History, InferenceEngine, RiskPredictor, RulePredictor, SavedModel, Sequential,
    TrainingSummary,
};
use super::preprocess::{to_categorical, LabelEncoder, StandardScaler};

/// What a run produced, for printing and tests
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub dataset_size: usize,
    pub class_distribution: BTreeMap<RiskLabel, usize>,
    pub train_size: usize,
    pub test_size: usize,
    pub history: History,
    pub test_loss: f32,
    pub test_accuracy: f32,
    pub baseline_label: RiskLabel,
    pub baseline_accuracy: f64,
}

impl PipelineReport {
    pub fn log_summary(&self) {
        log::info!("Dataset: {} samples {:?}", self.dataset_size, self.class_distribution);
        log::info!("Split: {} train / {} test", self.train_size, self.test_size);
        if let Some(last) = self.history.last() {
            log::info!("Final epoch: {}", last.progress_line(self.history.len()));
        }
        log::info!(
            "Test loss {:.4}, accuracy {:.4} (majority baseline {} = {:.4})",
            self.test_loss,
            self.test_accuracy,
            self.baseline_label,
            self.baseline_accuracy
        );
        if (self.test_accuracy as f64) <= self.baseline_accuracy {
            log::warn!("Model does not beat the majority-class baseline");
        }
    }
}

/// A trained model that has not been written yet
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub artifact: SavedModel,
    pub report: PipelineReport,
}

fn encode_targets(encoder: &LabelEncoder, data: &Dataset) -> PipelineResult<Array2<f32>> {
    let codes = encoder.transform(&data.labels)?;
    to_categorical(&codes, encoder.num_classes())
}

/// Run every stage up to (not including) saving
pub fn train(config: &PipelineConfig) -> PipelineResult<TrainedModel> {
    config.validate()?;

    // 1. Generate
    let data = dataset::generate(config.samples, config.seed);
    if data.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }
    let class_distribution = data.class_distribution();
    log::debug!("Generated {} samples", data.len());

    // 2. Split
    let split = dataset::train_test_split(&data, config.test_size, config.seed)?;
    log::info!("Split: {} train / {} test", split.train.len(), split.test.len());

    // 3. Scale (statistics from the training split only)
    let mut scaler = StandardScaler::new();
    let x_train = scaler.fit_transform(&split.train.features())?.mapv(|v| v as f32);
    let x_test = scaler.transform(&split.test.features())?.mapv(|v| v as f32);
    log::debug!("Scaler mean {:?} std {:?}", scaler.mean(), scaler.std());

    // 4. Encode (the class set is fixed, a rare class may be absent from a split)
    let encoder = LabelEncoder::for_all_labels();
    let y_train = encode_targets(&encoder, &split.train)?;
    let y_test = encode_targets(&encoder, &split.test)?;
    log::debug!("Label classes: {:?}", encoder.classes());

    // 5. Build
    let mut network = Sequential::classifier(
        FEATURE_COUNT,
        &HIDDEN_UNITS,
        encoder.num_classes(),
        config.dropout_rate,
        config.seed,
    )?;
    log::info!("Model:\n{}", network.summary());

    // 6. Train
    let history = model::fit(&mut network, &x_train, &y_train, &config.training)?;

    // 7. Evaluate
    let (test_loss, test_accuracy) = model::evaluate(&network, &x_test, &y_test)?;
    let (baseline_label, baseline_accuracy) = split
        .test
        .majority_baseline()
        .ok_or(PipelineError::EmptyDataset)?;
    let summary = TrainingSummary::from_history(
        &history,
        config.training.batch_size,
        split.train.len(),
        test_loss,
        test_accuracy,
    );
    let artifact = SavedModel::new(scaler, encoder, network).with_training(summary);

    Ok(TrainedModel {
        artifact,
        report: PipelineReport {
            dataset_size: data.len(),
            class_distribution,
            train_size: split.train.len(),
            test_size: split.test.len(),
            history,
            test_loss,
            test_accuracy,
            baseline_label,
            baseline_accuracy,
        },
    })
}

/// Write the model directory
pub fn save(trained: &TrainedModel, dir: &Path) -> PipelineResult<PathBuf> {
    model::save_model(&trained.artifact, dir)
}

/// Train and save
pub fn run(config: &PipelineConfig) -> PipelineResult<(PipelineReport, PathBuf)> {
    let trained = train(config)?;
    let path = save(&trained, &config.model_dir)?;
    Ok((trained.report, path))
}

/// One point well inside each rule region
pub fn reference_samples() -> Vec<Sample> {
    vec![
        Sample::new(2.0, 40, 0.5),
        Sample::new(6.0, 150, 3.5),
        Sample::new(11.0, 280, 7.5),
    ]
}

/// Reload a model directory (checksum and layout verified) and count how many
/// reference samples it labels the same way as the rule
pub fn verify_saved(dir: &Path) -> PipelineResult<usize> {
    let predictor = RiskPredictor::load(dir)?;
    let samples = reference_samples();
    let predictions = predictor.predict_batch(&samples)?;

    let mut agreed = 0;
    for (sample, prediction) in samples.iter().zip(&predictions) {
        let expected = RulePredictor.predict(sample)?.label;
        log::info!(
            "{:?} -> {} ({:.2}), rule says {}",
            sample.to_array(),
            prediction.label,
            prediction.confidence,
            expected
        );
        log::debug!("{} probabilities {:?}", prediction.method, prediction.probabilities);
        if prediction.label == expected {
            agreed += 1;
        }
    }
    Ok(agreed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MODEL_FILE_NAME;
    use std::fs;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.model_dir = dir.join("smartphone_addiction_model");
        config.training.verbose = false;
        config
    }

    #[test]
    fn test_full_pipeline_beats_majority_baseline() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let (report, path) = run(&config).unwrap();

        assert_eq!(report.dataset_size, 1000);
        assert_eq!(report.train_size, 800);
        assert_eq!(report.test_size, 200);
        assert_eq!(report.history.len(), 50);
        assert_eq!(report.baseline_label, RiskLabel::High);
        assert!(
            (report.test_accuracy as f64) > report.baseline_accuracy,
            "accuracy {} vs baseline {}",
            report.test_accuracy,
            report.baseline_accuracy
        );
        assert!(path.exists());

        // The saved model predicts the clear-cut cases
        let predictor = RiskPredictor::load(&config.model_dir).unwrap();
        let high = predictor.predict(&Sample::new(11.0, 280, 7.5)).unwrap();
        assert_eq!(high.label, RiskLabel::High);

        assert!(verify_saved(&config.model_dir).unwrap() >= 2);
    }

    #[test]
    fn test_reference_samples_cover_every_label() {
        let labels: Vec<RiskLabel> = reference_samples().iter().map(RiskLabel::classify).collect();
        assert_eq!(labels, vec![RiskLabel::Low, RiskLabel::Medium, RiskLabel::High]);
    }

    #[test]
    fn test_verify_saved_rejects_tampered_model() {
        let dir = tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.samples = 200;
        config.training.epochs = 2;
        run(&config).unwrap();

        let agreed = verify_saved(&config.model_dir).unwrap();
        assert!(agreed <= reference_samples().len());

        let model_path = config.model_dir.join(MODEL_FILE_NAME);
        let mut content = fs::read_to_string(&model_path).unwrap();
        content.push('\n');
        fs::write(&model_path, content).unwrap();
        assert!(matches!(
            verify_saved(&config.model_dir),
            Err(PipelineError::ChecksumMismatch { .. })
        ));

        assert!(matches!(
            verify_saved(&dir.path().join("absent")),
            Err(PipelineError::Io(_))
        ));
    }

    #[test]
    fn test_train_is_deterministic() {
        let dir = tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.samples = 200;
        config.training.epochs = 3;

        let a = train(&config).unwrap();
        let b = train(&config).unwrap();
        assert_eq!(a.report.history.epochs, b.report.history.epochs);
        assert_eq!(a.report.test_accuracy, b.report.test_accuracy);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.training.epochs = 0;
        assert!(matches!(train(&config), Err(PipelineError::InvalidConfig(_))));
        assert!(!config.model_dir.exists());
    }
}
