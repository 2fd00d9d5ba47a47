use thiserror::Error;

/// Ошибки построения и обучения сети. Все они синхронные и повтор не помогает:
/// операция, нарушившая инвариант, не выполняется даже частично.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Неверные аргументы: длина вектора, количество нейронов, номер итерации
    #[error("validation error: {0}")]
    Validation(String),
    /// Несовместимые слои или режим соединения
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Возможность объявлена, но не реализована (управляющие вентили)
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

pub type Result<T> = std::result::Result<T, NetworkError>;

impl NetworkError {
    pub fn validation(msg: impl Into<String>) -> Self {
        NetworkError::Validation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        NetworkError::Configuration(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        NetworkError::UnsupportedOperation(msg.into())
    }
}

/// Проверка длины вектора относительно количества нейронов
pub(crate) fn check_len(what: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(NetworkError::validation(format!(
            "length of {what} ({actual}) should be same as neuron count ({expected})"
        )));
    }
    Ok(())
}

/// Проверка номера итерации: 0 <= iteration < epochs
pub(crate) fn check_iteration(iteration: usize, epochs: usize) -> Result<()> {
    if epochs == 0 {
        return Err(NetworkError::validation("training epochs should be positive"));
    }
    if iteration >= epochs {
        return Err(NetworkError::validation(format!(
            "iteration {iteration} is out of range [0, {epochs})"
        )));
    }
    Ok(())
}

/// Все компоненты конечны (без NaN и бесконечностей)
pub(crate) fn check_finite(what: &str, values: &[f64]) -> Result<()> {
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(NetworkError::validation(format!(
            "{what}[{i}] is not a finite number"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_range() {
        assert!(check_iteration(0, 1).is_ok());
        assert!(check_iteration(9, 10).is_ok());
        assert!(matches!(check_iteration(10, 10), Err(NetworkError::Validation(_))));
        assert!(matches!(check_iteration(0, 0), Err(NetworkError::Validation(_))));
    }

    #[test]
    fn messages() {
        let err = check_len("input", 3, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error: length of input (3) should be same as neuron count (2)"
        );
        assert!(check_finite("input", &[0.0, f64::NAN]).is_err());
    }
}
