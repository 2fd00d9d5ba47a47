use crate::*;

/// Номер слоя в графе
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub usize);

/// Слой: непрерывный диапазон нейронов арены с общей функцией активации.
/// Нейроны одного слоя друг от друга в пределах одного шага не зависят.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// Диапазон нейронов в арене графа
    pub(crate) neurons: Range<usize>,
    pub(crate) activation: Activation,
    pub(crate) bias: BiasMode,
    pub(crate) initializer: Option<Initializer>,
    pub(crate) learning_rate: LearningRateFunction,
    /// Коннекторы, для которых слой - цель
    pub(crate) source_connectors: Vec<ConnectorId>,
    /// Коннекторы, для которых слой - источник
    pub(crate) target_connectors: Vec<ConnectorId>,
}

impl Layer {
    pub(crate) fn new(topology: &LayerTopology, neurons: Range<usize>) -> Self {
        Self {
            neurons,
            activation: topology.activation,
            bias: topology.bias,
            initializer: topology.initializer,
            learning_rate: LearningRateFunction::default(),
            source_connectors: Vec::new(),
            target_connectors: Vec::new(),
        }
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Номера нейронов слоя в арене
    pub fn neurons(&self) -> Range<usize> {
        self.neurons.clone()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn bias_mode(&self) -> BiasMode {
        self.bias
    }

    pub fn initializer(&self) -> Option<Initializer> {
        self.initializer
    }

    pub fn learning_rate(&self) -> &LearningRateFunction {
        &self.learning_rate
    }

    pub fn source_connectors(&self) -> &[ConnectorId] {
        &self.source_connectors
    }

    pub fn target_connectors(&self) -> &[ConnectorId] {
        &self.target_connectors
    }
}
