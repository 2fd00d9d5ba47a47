use crate::*;

/// Обучение с учителем: эпохи по набору примеров до порога ошибки или лимита итераций
#[derive(Clone, Copy, Debug, Default)]
pub struct Teacher {
    parameters: TeachingParameters,
}

impl Teacher {
    pub fn new(parameters: TeachingParameters) -> Result<Self> {
        parameters.validate()?;
        Ok(Self { parameters })
    }

    pub fn parameters(&self) -> &TeachingParameters {
        &self.parameters
    }

    pub fn train(&self, network: &mut Network, set: &TrainingSet) -> Result<TrainingReport> {
        train(network, set, &self.parameters)
    }
}

/// Обучение сети на наборе. Скорость обучения всех слоёв становится постоянной
/// `parameters.learning_rate`.
pub fn train(network: &mut Network, set: &TrainingSet, parameters: &TeachingParameters) -> Result<TrainingReport> {
    parameters.validate()?;
    network.set_learning_rate(parameters.learning_rate)?;
    info!(
        "training on {} samples: {} iterations max, error threshold {}",
        set.len(),
        parameters.iterations,
        parameters.error_threshold
    );
    let mut report = TrainingReport {
        epochs: 0,
        mean_squared_error: f64::INFINITY,
        converged: false,
    };
    for i in 0..parameters.iterations {
        report.mean_squared_error = network.learn_epoch(set, i, parameters.iterations)?;
        report.epochs = i + 1;
        if i % 1000 == 0 {
            trace!("epoch {i}: mean squared error {}", report.mean_squared_error);
        }
        if report.mean_squared_error <= parameters.error_threshold {
            report.converged = true;
            break;
        }
    }
    if report.converged {
        info!(
            "converged after {} epochs, mean squared error {}",
            report.epochs, report.mean_squared_error
        );
    } else {
        info!(
            "stopped after {} epochs, mean squared error {}",
            report.epochs, report.mean_squared_error
        );
    }
    Ok(report)
}
