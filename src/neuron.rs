use crate::*;

/// Нейрон. Принадлежит ровно одному слою, синапсы хранит номерами в арене графа.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Neuron {
    pub input: f64,
    /// Результат последнего run (0, если не запускался)
    pub output: f64,
    pub error: f64,
    pub bias: f64,
    /// Номер слоя в графе
    pub(crate) layer: usize,
    /// Входящие синапсы (номера в арене)
    pub(crate) source_synapses: Vec<usize>,
    /// Исходящие синапсы (номера в арене)
    pub(crate) target_synapses: Vec<usize>,
}

impl Neuron {
    pub(crate) fn new(layer: usize, bias: f64) -> Self {
        Self {
            layer,
            bias,
            ..Default::default()
        }
    }

    pub fn layer(&self) -> LayerId {
        LayerId(self.layer)
    }

    pub fn source_synapses(&self) -> &[usize] {
        &self.source_synapses
    }

    pub fn target_synapses(&self) -> &[usize] {
        &self.target_synapses
    }
}

/// Взвешенная связь source -> target. Принадлежит ровно одному коннектору.
#[derive(Clone, Debug, PartialEq)]
pub struct Synapse {
    pub weight: f64,
    /// Предыдущее приращение веса (для момента)
    pub previous_delta: f64,
    pub(crate) source: usize,
    pub(crate) target: usize,
    pub(crate) connector: usize,
}

impl Synapse {
    pub(crate) fn new(source: usize, target: usize, connector: usize) -> Self {
        Self {
            weight: 1.0,
            previous_delta: 0.0,
            source,
            target,
            connector,
        }
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn connector(&self) -> ConnectorId {
        ConnectorId(self.connector)
    }

    /// Вклад в вход целевого нейрона
    pub fn propagate(&self, neurons: &[Neuron]) -> f64 {
        self.weight * neurons[self.source].output
    }

    /// Вклад в ошибку исходного нейрона
    pub fn backpropagate(&self, neurons: &[Neuron]) -> f64 {
        self.weight * neurons[self.target].error
    }

    /// Вклад в квадрат евклидова расстояния от весов целевого нейрона до входа
    pub fn squared_distance(&self, neurons: &[Neuron]) -> f64 {
        let d = neurons[self.source].output - self.weight;
        d * d
    }

    /// Шаг градиентного спуска с моментом
    pub fn optimize_weight(&mut self, neurons: &[Neuron], learning_rate: f64, momentum: f64) {
        let delta = learning_rate * neurons[self.target].error * neurons[self.source].output
            + momentum * self.previous_delta;
        self.weight += delta;
        self.previous_delta = delta;
    }

    /// Шаг конкурентного обучения: вес тянется к выходу исходного нейрона
    pub fn optimize_toward_source(&mut self, neurons: &[Neuron], rate: f64) {
        self.weight += rate * (neurons[self.source].output - self.weight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pair() -> Vec<Neuron> {
        let mut src = Neuron::new(0, 0.0);
        src.output = 0.5;
        let mut dst = Neuron::new(1, 0.0);
        dst.error = 0.2;
        vec![src, dst]
    }

    #[test]
    fn momentum() {
        let neurons = pair();
        let mut synapse = Synapse::new(0, 1, 0);
        synapse.weight = 0.4;
        synapse.optimize_weight(&neurons, 0.3, 0.07);
        assert_relative_eq!(synapse.previous_delta, 0.03);
        assert_relative_eq!(synapse.weight, 0.43);
        synapse.optimize_weight(&neurons, 0.3, 0.07);
        assert_relative_eq!(synapse.previous_delta, 0.03 + 0.07 * 0.03);
    }

    #[test]
    fn signals() {
        let neurons = pair();
        let mut synapse = Synapse::new(0, 1, 0);
        synapse.weight = -2.0;
        assert_relative_eq!(synapse.propagate(&neurons), -1.0);
        assert_relative_eq!(synapse.backpropagate(&neurons), -0.4);
        assert_relative_eq!(synapse.squared_distance(&neurons), 6.25);
        synapse.optimize_toward_source(&neurons, 0.5);
        assert_relative_eq!(synapse.weight, -0.75);
    }
}
