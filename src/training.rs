use crate::*;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Обучающий пример. Неизменяемый, хранит собственные копии векторов
/// и их нормированные варианты.
///
/// Равенство и хэш определяются только входным вектором: два примера с одинаковым
/// входом и разными выходами равны.
#[derive(Clone, Debug)]
pub struct TrainingSample {
    input: Vec<f64>,
    output: Vec<f64>,
    normalized_input: Vec<f64>,
    normalized_output: Vec<f64>,
}

impl TrainingSample {
    pub fn new(input: &[f64], output: &[f64]) -> Result<Self> {
        check_finite("input", input)?;
        check_finite("output", output)?;
        Ok(Self {
            input: input.to_vec(),
            output: output.to_vec(),
            normalized_input: normalize(input),
            normalized_output: normalize(output),
        })
    }

    /// Пример без выхода (обучение без учителя)
    pub fn unsupervised(input: &[f64]) -> Result<Self> {
        Self::new(input, &[])
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn output(&self) -> &[f64] {
        &self.output
    }

    pub fn normalized_input(&self) -> &[f64] {
        &self.normalized_input
    }

    pub fn normalized_output(&self) -> &[f64] {
        &self.normalized_output
    }
}

impl PartialEq for TrainingSample {
    fn eq(&self, other: &Self) -> bool {
        self.input == other.input
    }
}

//NaN во входе не бывает, значит равенство рефлексивно
impl Eq for TrainingSample {}

impl Hash for TrainingSample {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.input.len().hash(state);
        for x in &self.input {
            //-0.0 и 0.0 равны, хэш тоже должен совпасть
            (x + 0.0).to_bits().hash(state);
        }
    }
}

/// Вектор единичной длины того же направления; нулевой вектор остаётся нулевым
pub fn normalize(v: &[f64]) -> Vec<f64> {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / norm).collect()
}

/// Набор примеров с фиксированными размерами входа и выхода
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSet {
    input_size: usize,
    output_size: usize,
    samples: Vec<TrainingSample>,
}

impl TrainingSet {
    pub fn new(input_size: usize, output_size: usize) -> Result<Self> {
        if input_size == 0 {
            return Err(NetworkError::validation("input size should be positive"));
        }
        Ok(Self {
            input_size,
            output_size,
            samples: Vec::new(),
        })
    }

    /// Набор из пар (вход, выход)
    pub fn from_pairs(input_size: usize, output_size: usize, pairs: &[(&[f64], &[f64])]) -> Result<Self> {
        let mut set = Self::new(input_size, output_size)?;
        for (input, output) in pairs {
            set.add(TrainingSample::new(input, output)?)?;
        }
        Ok(set)
    }

    pub fn add(&mut self, sample: TrainingSample) -> Result<()> {
        if sample.input().len() != self.input_size {
            return Err(NetworkError::validation(format!(
                "sample input length {} differs from set input size {}",
                sample.input().len(),
                self.input_size
            )));
        }
        if sample.output().len() != self.output_size {
            return Err(NetworkError::validation(format!(
                "sample output length {} differs from set output size {}",
                sample.output().len(),
                self.output_size
            )));
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrainingSample> + '_ {
        self.samples.iter()
    }
}

/// Параметры обучения с учителем
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeachingParameters {
    /// Максимальное число эпох
    pub iterations: usize,
    /// Порог среднеквадратичной ошибки для досрочной остановки
    pub error_threshold: f64,
    pub learning_rate: f64,
}

impl Default for TeachingParameters {
    fn default() -> Self {
        Self {
            iterations: 20000,
            error_threshold: 0.005,
            learning_rate: 0.3,
        }
    }
}

impl TeachingParameters {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(NetworkError::validation("iterations should be positive"));
        }
        if !self.error_threshold.is_finite() || self.error_threshold < 0.0 {
            return Err(NetworkError::validation("error threshold should be non-negative"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NetworkError::validation("learning rate should be positive"));
        }
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let parameters: TeachingParameters = serde_yaml::from_str(yaml)
            .map_err(|e| NetworkError::validation(format!("teaching parameters: {e}")))?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Загрузка из YAML файла
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            NetworkError::validation(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| NetworkError::validation(format!("teaching parameters: {e}")))
    }
}

/// Итог обучения
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingReport {
    /// Сколько эпох выполнено
    pub epochs: usize,
    /// Среднеквадратичная ошибка последней эпохи
    pub mean_squared_error: f64,
    /// Достигнут ли порог ошибки
    pub converged: bool,
}
