use crate::*;

/// Обучаемая сеть: граф и его входной/выходной слои
#[derive(Clone, Debug)]
pub struct Network {
    graph: Graph,
    input_layer: LayerId,
    output_layer: LayerId,
    mean_squared_error: f64,
}

impl Network {
    pub fn new(graph: Graph, input_layer: LayerId, output_layer: LayerId) -> Result<Self> {
        graph.layer(input_layer)?;
        graph.layer(output_layer)?;
        if input_layer == output_layer {
            return Err(NetworkError::configuration("input and output layers should differ"));
        }
        Ok(Self {
            graph,
            input_layer,
            output_layer,
            mean_squared_error: 0.0,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn input_layer(&self) -> LayerId {
        self.input_layer
    }

    pub fn output_layer(&self) -> LayerId {
        self.output_layer
    }

    pub fn input_size(&self) -> usize {
        self.graph.layers[self.input_layer.0].neuron_count()
    }

    pub fn output_size(&self) -> usize {
        self.graph.layers[self.output_layer.0].neuron_count()
    }

    /// Среднеквадратичная ошибка последней эпохи
    pub fn mean_squared_error(&self) -> f64 {
        self.mean_squared_error
    }

    /// Прямой проход: вход -> выход
    pub fn run(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.graph.set_input(self.input_layer, input)?;
        self.graph.run_all()?;
        self.graph.output(self.output_layer)
    }

    /// Один пример: прямой проход, ошибки, обратный проход, обучение.
    /// Возвращает сумму квадратов ошибок выходного слоя.
    pub fn learn_sample(&mut self, sample: &TrainingSample, iteration: usize, epochs: usize) -> Result<f64> {
        self.run(sample.input())?;
        let squared_error = self.graph.set_errors(self.output_layer, sample.output())?;
        self.graph.evaluate_errors_all()?;
        self.graph.learn_all(iteration, epochs)?;
        Ok(squared_error)
    }

    /// Одна эпоха по всему набору. Возвращает среднюю по примерам сумму квадратов ошибок.
    pub fn learn_epoch(&mut self, set: &TrainingSet, iteration: usize, epochs: usize) -> Result<f64> {
        if set.is_empty() {
            return Err(NetworkError::validation("training set is empty"));
        }
        check_len("training set input", set.input_size(), self.input_size())?;
        check_len("training set output", set.output_size(), self.output_size())?;
        let mut total = 0.0;
        for sample in set.iter() {
            total += self.learn_sample(sample, iteration, epochs)?;
        }
        self.mean_squared_error = total / set.len() as f64;
        Ok(self.mean_squared_error)
    }

    /// Постоянная скорость обучения на всех слоях
    pub fn set_learning_rate(&mut self, rate: f64) -> Result<()> {
        self.set_learning_rate_function(LearningRateFunction::constant(rate))
    }

    /// Скорость обучения, равномерно меняющаяся от initial к final
    pub fn set_learning_rate_range(&mut self, initial: f64, final_rate: f64) -> Result<()> {
        self.set_learning_rate_function(LearningRateFunction::linear(initial, final_rate))
    }

    pub fn set_learning_rate_function(&mut self, function: LearningRateFunction) -> Result<()> {
        if !function.initial_rate().is_finite() || !function.final_rate().is_finite() {
            return Err(NetworkError::validation("learning rate is not a finite number"));
        }
        for id in 0..self.graph.layers.len() {
            self.graph.set_learning_rate(LayerId(id), function)?;
        }
        Ok(())
    }

    pub fn initialize(&mut self, rng: &mut dyn RngCore) -> Result<()> {
        self.graph.initialize(rng)
    }

    /// Шум на веса всех коннекторов
    pub fn jitter(&mut self, limit: f64, rng: &mut dyn RngCore) -> Result<()> {
        for id in 0..self.graph.connectors.len() {
            self.graph.jitter(ConnectorId(id), limit, rng)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Network {
        let mut graph = Graph::new();
        let input = graph.add_layer(LayerTopology::linear(2)).unwrap();
        let output = graph.add_layer(LayerTopology::sigmoid(1)).unwrap();
        graph.connect(input, output, ConnectionMode::AllToAll).unwrap();
        Network::new(graph, input, output).unwrap()
    }

    #[test]
    fn run_checks_length() {
        let mut network = tiny();
        assert_eq!(network.run(&[0.0, 0.0]).unwrap(), vec![0.5]);
        assert!(matches!(network.run(&[0.0]), Err(NetworkError::Validation(_))));
    }

    #[test]
    fn epoch_reduces_error() {
        let mut network = tiny();
        network.set_learning_rate(0.5).unwrap();
        let set = TrainingSet::from_pairs(2, 1, &[(&[1.0, 0.0], &[1.0]), (&[0.0, 1.0], &[0.0])]).unwrap();
        let first = network.learn_epoch(&set, 0, 50).unwrap();
        let mut last = first;
        for i in 1..50 {
            last = network.learn_epoch(&set, i, 50).unwrap();
        }
        assert!(last < first);
        assert_eq!(network.mean_squared_error(), last);

        let wrong = TrainingSet::from_pairs(3, 1, &[(&[1.0, 0.0, 0.0], &[1.0])]).unwrap();
        assert!(network.learn_epoch(&wrong, 0, 1).is_err());
    }

    #[test]
    fn terminals() {
        let mut graph = Graph::new();
        let a = graph.add_layer(LayerTopology::linear(1)).unwrap();
        assert!(Network::new(graph.clone(), a, a).is_err());
        assert!(Network::new(graph, a, LayerId(3)).is_err());
    }
}
