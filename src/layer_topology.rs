use crate::*;

/// Режим смещения слоя: обучаемое или замороженное (входные слои, вентили LSTM)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiasMode {
    Learnable,
    Fixed,
}

/// Топология слоя: всё, что задаётся при создании и потом не меняется
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerTopology {
    /// Количество нейронов в слое
    pub neurons: usize,
    /// Функция активации слоя
    pub activation: Activation,
    /// Обучается ли смещение
    pub bias: BiasMode,
    /// Начальное смещение всех нейронов (до инициализации)
    pub initial_bias: f64,
    /// Инициализатор смещений, None - не трогать
    pub initializer: Option<Initializer>,
}

impl LayerTopology {
    /// Слой с настройками по умолчанию для функции активации
    pub fn new(activation: Activation, neurons: usize) -> Self {
        Self {
            neurons,
            activation,
            bias: activation.default_bias_mode(),
            initial_bias: 0.0,
            initializer: activation.default_initializer(),
        }
    }

    pub fn linear(neurons: usize) -> Self {
        Self::new(Activation::Linear, neurons)
    }

    pub fn sigmoid(neurons: usize) -> Self {
        Self::new(Activation::Sigmoid, neurons)
    }

    pub fn tanh(neurons: usize) -> Self {
        Self::new(Activation::Tanh, neurons)
    }

    pub fn sine(neurons: usize) -> Self {
        Self::new(Activation::Sine, neurons)
    }

    /// Заморозить смещения
    pub fn fixed_bias(mut self) -> Self {
        self.bias = BiasMode::Fixed;
        self
    }

    /// Заморозить смещения на заданном значении (инициализатор их не перезапишет)
    pub fn fixed_bias_value(mut self, bias: f64) -> Self {
        self.bias = BiasMode::Fixed;
        self.initial_bias = bias;
        self.initializer = Some(Initializer::Constant(bias));
        self
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.initial_bias = bias;
        self
    }

    pub fn with_initializer(mut self, initializer: Option<Initializer>) -> Self {
        self.initializer = initializer;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.neurons == 0 {
            return Err(NetworkError::validation("neuron count should be positive"));
        }
        if !self.initial_bias.is_finite() {
            return Err(NetworkError::validation("initial bias is not a finite number"));
        }
        if let Some(initializer) = &self.initializer {
            initializer.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_topology() {
        let gate = LayerTopology::sigmoid(3).fixed_bias_value(1.0);
        assert_eq!(gate.bias, BiasMode::Fixed);
        assert_eq!(gate.initializer, Some(Initializer::Constant(1.0)));
        assert!(gate.validate().is_ok());
    }

    #[test]
    fn empty_layer() {
        assert!(matches!(
            LayerTopology::linear(0).validate(),
            Err(NetworkError::Validation(_))
        ));
    }
}
