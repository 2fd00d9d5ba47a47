use crate::*;

/// Расписание скорости обучения: (итерация, всего эпох) -> эффективная скорость
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LearningRateFunction {
    /// Равномерное изменение от initial к final
    Linear { initial: f64, final_rate: f64 },
    /// Гиперболическое убывание от initial к final
    Hyperbolic { initial: f64, final_rate: f64 },
}

impl Default for LearningRateFunction {
    fn default() -> Self {
        LearningRateFunction::Linear { initial: 0.3, final_rate: 0.05 }
    }
}

impl LearningRateFunction {
    /// Постоянная скорость
    pub fn constant(rate: f64) -> Self {
        LearningRateFunction::Linear { initial: rate, final_rate: rate }
    }

    pub fn linear(initial: f64, final_rate: f64) -> Self {
        LearningRateFunction::Linear { initial, final_rate }
    }

    pub fn hyperbolic(initial: f64, final_rate: f64) -> Self {
        LearningRateFunction::Hyperbolic { initial, final_rate }
    }

    pub fn initial_rate(&self) -> f64 {
        match *self {
            LearningRateFunction::Linear { initial, .. }
            | LearningRateFunction::Hyperbolic { initial, .. } => initial,
        }
    }

    pub fn final_rate(&self) -> f64 {
        match *self {
            LearningRateFunction::Linear { final_rate, .. }
            | LearningRateFunction::Hyperbolic { final_rate, .. } => final_rate,
        }
    }

    /// Эффективная скорость на итерации `iteration` из `epochs`
    pub fn rate(&self, iteration: usize, epochs: usize) -> Result<f64> {
        check_iteration(iteration, epochs)?;
        let i = iteration as f64;
        let n = epochs as f64;
        let rate = match *self {
            LearningRateFunction::Linear { initial, final_rate } => {
                if epochs == 1 {
                    initial
                } else {
                    initial + (final_rate - initial) * i / (n - 1.0)
                }
            }
            LearningRateFunction::Hyperbolic { initial, final_rate } => {
                let denominator = final_rate + (initial - final_rate) * i / n;
                if denominator == 0.0 {
                    0.0
                } else {
                    initial * (final_rate / denominator)
                }
            }
        };
        Ok(rate)
    }
}
