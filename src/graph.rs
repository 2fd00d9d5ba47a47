use crate::*;

/// Вид управляющего вентиля (LSTM)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateType {
    Input,
    Output,
    OneToOne,
}

/// Граф сети. Все нейроны, синапсы, слои и коннекторы лежат в плоских аренах,
/// перекрёстные ссылки - это номера в аренах.
///
/// Слои выполняются в порядке добавления (`run_all`), ошибки считаются в обратном
/// порядке (`evaluate_errors_all`).
#[derive(Clone, Debug, Default)]
pub struct Graph {
    pub(crate) neurons: Vec<Neuron>,
    pub(crate) synapses: Vec<Synapse>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) connectors: Vec<Connector>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Новый слой из `topology.neurons` нейронов
    pub fn add_layer(&mut self, topology: LayerTopology) -> Result<LayerId> {
        topology.validate()?;
        let id = self.layers.len();
        let start = self.neurons.len();
        self.neurons.try_reserve(topology.neurons).map_err(|e| {
            NetworkError::validation(format!("layer of {} neurons: {e}", topology.neurons))
        })?;
        self.neurons
            .extend((0..topology.neurons).map(|_| Neuron::new(id, topology.initial_bias)));
        self.layers.push(Layer::new(&topology, start..self.neurons.len()));
        debug!(
            "layer {id}: {} {:?} neurons, bias {:?}",
            topology.neurons, topology.activation, topology.bias
        );
        Ok(LayerId(id))
    }

    /// Коннектор обратного распространения между слоями
    pub fn connect(&mut self, source: LayerId, target: LayerId, mode: ConnectionMode) -> Result<ConnectorId> {
        self.build_connector(
            source,
            target,
            mode,
            ConnectorKind::Backpropagation,
            Some(Initializer::default()),
        )
    }

    pub(crate) fn build_connector(
        &mut self,
        source: LayerId,
        target: LayerId,
        mode: ConnectionMode,
        kind: ConnectorKind,
        initializer: Option<Initializer>,
    ) -> Result<ConnectorId> {
        let pairs = connection_pairs(
            self.layer(source)?.neurons(),
            self.layer(target)?.neurons(),
            mode,
        )?;
        //дальше ошибок нет: граф меняется целиком или никак
        let id = self.connectors.len();
        let start = self.synapses.len();
        for (s, t) in pairs {
            let synapse = self.synapses.len();
            self.synapses.push(Synapse::new(s, t, id));
            self.neurons[s].target_synapses.push(synapse);
            self.neurons[t].source_synapses.push(synapse);
        }
        self.connectors.push(Connector {
            source_layer: source,
            target_layer: target,
            mode,
            kind,
            synapses: start..self.synapses.len(),
            momentum: DEFAULT_MOMENTUM,
            initializer,
        });
        self.layers[source.0].target_connectors.push(ConnectorId(id));
        self.layers[target.0].source_connectors.push(ConnectorId(id));
        debug!(
            "connector {id}: layer {} -> layer {} {:?}, {} synapses",
            source.0,
            target.0,
            mode,
            self.synapses.len() - start
        );
        Ok(ConnectorId(id))
    }

    /// Управляющие вентили на синапсах коннектора не реализованы
    pub fn gate(&mut self, connector: ConnectorId, gater: LayerId, gate: GateType) -> Result<()> {
        self.connector(connector)?;
        self.layer(gater)?;
        Err(NetworkError::unsupported(format!(
            "{gate:?} gating of connector {} by layer {} is not supported",
            connector.0, gater.0
        )))
    }

    pub fn layer(&self, id: LayerId) -> Result<&Layer> {
        self.layers
            .get(id.0)
            .ok_or_else(|| NetworkError::validation(format!("unknown layer {}", id.0)))
    }

    pub fn connector(&self, id: ConnectorId) -> Result<&Connector> {
        self.connectors
            .get(id.0)
            .ok_or_else(|| NetworkError::validation(format!("unknown connector {}", id.0)))
    }

    fn layer_mut(&mut self, id: LayerId) -> Result<&mut Layer> {
        self.layers
            .get_mut(id.0)
            .ok_or_else(|| NetworkError::validation(format!("unknown layer {}", id.0)))
    }

    fn connector_mut(&mut self, id: ConnectorId) -> Result<&mut Connector> {
        self.connectors
            .get_mut(id.0)
            .ok_or_else(|| NetworkError::validation(format!("unknown connector {}", id.0)))
    }

    /// Слои в порядке выполнения
    pub fn layer_ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        (0..self.layers.len()).map(LayerId)
    }

    pub fn connector_ids(&self) -> impl Iterator<Item = ConnectorId> + '_ {
        (0..self.connectors.len()).map(ConnectorId)
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    /// Входные синапсы нейрона, принадлежащие коннектору
    pub fn source_synapses_of(
        &self,
        neuron: usize,
        connector: ConnectorId,
    ) -> Result<impl Iterator<Item = usize> + '_> {
        self.connector(connector)?;
        Ok(self
            .neuron(neuron)?
            .source_synapses
            .iter()
            .copied()
            .filter(move |&s| self.synapses[s].connector == connector.0))
    }

    /// Выходные синапсы нейрона, принадлежащие коннектору
    pub fn target_synapses_of(
        &self,
        neuron: usize,
        connector: ConnectorId,
    ) -> Result<impl Iterator<Item = usize> + '_> {
        self.connector(connector)?;
        Ok(self
            .neuron(neuron)?
            .target_synapses
            .iter()
            .copied()
            .filter(move |&s| self.synapses[s].connector == connector.0))
    }

    fn neuron(&self, neuron: usize) -> Result<&Neuron> {
        self.neurons
            .get(neuron)
            .ok_or_else(|| NetworkError::validation(format!("unknown neuron {neuron}")))
    }

    /// Рекуррентный коннектор: цель выполняется не позже источника
    fn is_recurrent(&self, connector: usize) -> bool {
        let c = &self.connectors[connector];
        c.target_layer <= c.source_layer
    }

    /// Входы нейронов слоя напрямую (для входных слоёв)
    pub fn set_input(&mut self, layer: LayerId, input: &[f64]) -> Result<()> {
        let neurons = self.layer(layer)?.neurons();
        check_len("input", input.len(), neurons.len())?;
        check_finite("input", input)?;
        for (n, &x) in neurons.zip_eq(input) {
            self.neurons[n].input = x;
        }
        Ok(())
    }

    /// Прямой проход по слою. Новые значения всех нейронов считаются до записи,
    /// поэтому самосвязи слоя видят выходы предыдущего шага.
    ///
    /// Слой с входным коннектором Кохонена вместо взвешенной суммы получает
    /// евклидово расстояние от весов этого коннектора до выходов источника.
    pub fn run(&mut self, layer: LayerId) -> Result<()> {
        let (neurons, activation, competitive) = {
            let l = self.layer(layer)?;
            let competitive = l
                .source_connectors()
                .iter()
                .any(|c| self.connectors[c.0].kind == ConnectorKind::Kohonen);
            (l.neurons(), l.activation(), competitive)
        };
        let updates: Vec<(f64, f64)> = neurons
            .clone()
            .map(|n| {
                let neuron = &self.neurons[n];
                if competitive {
                    let distance = neuron
                        .source_synapses
                        .iter()
                        .map(|&s| &self.synapses[s])
                        .filter(|s| self.connectors[s.connector].kind == ConnectorKind::Kohonen)
                        .map(|s| s.squared_distance(&self.neurons))
                        .sum::<f64>()
                        .sqrt();
                    return (distance, distance);
                }
                let input = if neuron.source_synapses.is_empty() {
                    neuron.input
                } else {
                    neuron
                        .source_synapses
                        .iter()
                        .map(|&s| self.synapses[s].propagate(&self.neurons))
                        .sum::<f64>()
                };
                (input, activation.activate(neuron.bias + input, neuron.output))
            })
            .collect();
        for (n, (input, output)) in neurons.zip_eq(updates) {
            self.neurons[n].input = input;
            self.neurons[n].output = output;
        }
        Ok(())
    }

    /// Выходы нейронов слоя
    pub fn output(&self, layer: LayerId) -> Result<Vec<f64>> {
        Ok(self.layer(layer)?.neurons().map(|n| self.neurons[n].output).collect())
    }

    /// Ошибки выходного слоя: expected - output. Возвращает сумму квадратов ошибок.
    pub fn set_errors(&mut self, layer: LayerId, expected: &[f64]) -> Result<f64> {
        let neurons = self.layer(layer)?.neurons();
        check_len("expected output", expected.len(), neurons.len())?;
        check_finite("expected output", expected)?;
        let mut squared_error = 0.0;
        for (n, &e) in neurons.zip_eq(expected) {
            let neuron = &mut self.neurons[n];
            neuron.error = e - neuron.output;
            squared_error += neuron.error * neuron.error;
        }
        Ok(squared_error)
    }

    /// Обратный проход по слою. Ошибка собирается по прямым (не рекуррентным)
    /// выходным синапсам; если их нет, остаётся заданная через `set_errors`.
    pub fn evaluate_errors(&mut self, layer: LayerId) -> Result<()> {
        let (neurons, activation) = {
            let l = self.layer(layer)?;
            (l.neurons(), l.activation())
        };
        let errors: Vec<f64> = neurons
            .clone()
            .map(|n| {
                let neuron = &self.neurons[n];
                let mut forward = neuron
                    .target_synapses
                    .iter()
                    .filter(|&&s| !self.is_recurrent(self.synapses[s].connector))
                    .peekable();
                let error = if forward.peek().is_some() {
                    forward.map(|&s| self.synapses[s].backpropagate(&self.neurons)).sum::<f64>()
                } else {
                    neuron.error
                };
                error * activation.derivative(neuron.input, neuron.output)
            })
            .collect();
        for (n, error) in neurons.zip_eq(errors) {
            self.neurons[n].error = error;
        }
        Ok(())
    }

    /// Обучение слоя: смещения (если не заморожены) и веса входных синапсов
    pub fn learn(&mut self, layer: LayerId, iteration: usize, epochs: usize) -> Result<()> {
        let (neurons, bias, rate) = {
            let l = self.layer(layer)?;
            (l.neurons(), l.bias_mode(), l.learning_rate().rate(iteration, epochs)?)
        };
        if bias == BiasMode::Learnable {
            for n in neurons.clone() {
                let neuron = &mut self.neurons[n];
                neuron.bias += rate * neuron.error;
            }
        }
        let Graph { neurons: arena, synapses, connectors, .. } = self;
        for n in neurons {
            for &s in &arena[n].source_synapses {
                let connector = &connectors[synapses[s].connector];
                if connector.kind == ConnectorKind::Backpropagation {
                    synapses[s].optimize_weight(arena, rate, connector.momentum);
                }
            }
        }
        Ok(())
    }

    /// Прямой проход по всем слоям
    pub fn run_all(&mut self) -> Result<()> {
        for id in 0..self.layers.len() {
            self.run(LayerId(id))?;
        }
        Ok(())
    }

    /// Обратный проход по всем слоям, от последнего к первому
    pub fn evaluate_errors_all(&mut self) -> Result<()> {
        for id in (0..self.layers.len()).rev() {
            self.evaluate_errors(LayerId(id))?;
        }
        Ok(())
    }

    pub fn learn_all(&mut self, iteration: usize, epochs: usize) -> Result<()> {
        for id in 0..self.layers.len() {
            self.learn(LayerId(id), iteration, epochs)?;
        }
        Ok(())
    }

    /// Начальные значения: сначала смещения всех слоёв, потом веса всех коннекторов
    pub fn initialize(&mut self, rng: &mut dyn RngCore) -> Result<()> {
        for id in 0..self.layers.len() {
            self.initialize_layer(LayerId(id), rng)?;
        }
        for id in 0..self.connectors.len() {
            self.initialize_connector(ConnectorId(id), rng)?;
        }
        Ok(())
    }

    pub fn initialize_layer(&mut self, layer: LayerId, rng: &mut dyn RngCore) -> Result<()> {
        let initializer = self.layer(layer)?.initializer();
        match initializer {
            Some(initializer) => initializer.initialize_layer(self, layer, rng),
            None => Ok(()),
        }
    }

    pub fn initialize_connector(&mut self, connector: ConnectorId, rng: &mut dyn RngCore) -> Result<()> {
        let initializer = self.connector(connector)?.initializer();
        match initializer {
            Some(initializer) => initializer.initialize_connector(self, connector, rng),
            None => Ok(()),
        }
    }

    pub fn set_layer_initializer(&mut self, layer: LayerId, initializer: Option<Initializer>) -> Result<()> {
        if let Some(i) = &initializer {
            i.validate()?;
        }
        self.layer_mut(layer)?.initializer = initializer;
        Ok(())
    }

    pub fn set_connector_initializer(&mut self, connector: ConnectorId, initializer: Option<Initializer>) -> Result<()> {
        if let Some(i) = &initializer {
            i.validate()?;
        }
        self.connector_mut(connector)?.initializer = initializer;
        Ok(())
    }

    pub fn set_learning_rate(&mut self, layer: LayerId, function: LearningRateFunction) -> Result<()> {
        self.layer_mut(layer)?.learning_rate = function;
        Ok(())
    }

    pub fn set_momentum(&mut self, connector: ConnectorId, momentum: f64) -> Result<()> {
        if !momentum.is_finite() {
            return Err(NetworkError::validation("momentum is not a finite number"));
        }
        self.connector_mut(connector)?.momentum = momentum;
        Ok(())
    }

    /// Одинаковое смещение для всех нейронов слоя
    pub fn set_bias(&mut self, layer: LayerId, bias: f64) -> Result<()> {
        if !bias.is_finite() {
            return Err(NetworkError::validation("bias is not a finite number"));
        }
        for n in self.layer(layer)?.neurons() {
            self.neurons[n].bias = bias;
        }
        Ok(())
    }

    pub fn biases(&self, layer: LayerId) -> Result<Vec<f64>> {
        Ok(self.layer(layer)?.neurons().map(|n| self.neurons[n].bias).collect())
    }

    pub fn errors(&self, layer: LayerId) -> Result<Vec<f64>> {
        Ok(self.layer(layer)?.neurons().map(|n| self.neurons[n].error).collect())
    }

    /// Веса коннектора в порядке построения синапсов
    pub fn weights(&self, connector: ConnectorId) -> Result<Vec<f64>> {
        Ok(self.connector(connector)?.synapses().map(|s| self.synapses[s].weight).collect())
    }

    pub fn set_weights(&mut self, connector: ConnectorId, weights: &[f64]) -> Result<()> {
        let synapses = self.connector(connector)?.synapses();
        check_len("weights", weights.len(), synapses.len())?;
        check_finite("weights", weights)?;
        for (s, &w) in synapses.zip_eq(weights) {
            self.synapses[s].weight = w;
        }
        Ok(())
    }

    /// Случайный шум из [-limit, limit] к каждому весу коннектора (смещения не трогаем)
    pub fn jitter(&mut self, connector: ConnectorId, limit: f64, rng: &mut dyn RngCore) -> Result<()> {
        if !limit.is_finite() || limit < 0.0 {
            return Err(NetworkError::validation(format!("invalid jitter limit {limit}")));
        }
        let synapses = self.connector(connector)?.synapses();
        if limit == 0.0 {
            return Ok(());
        }
        for s in synapses {
            self.synapses[s].weight += rng.gen_range(-limit..=limit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn construction() {
        let mut graph = Graph::new();
        let a = graph.add_layer(LayerTopology::linear(3)).unwrap();
        let b = graph.add_layer(LayerTopology::sigmoid(2)).unwrap();
        let c = graph.connect(a, b, ConnectionMode::AllToAll).unwrap();
        let own = graph.connect(b, b, ConnectionMode::AllToElse).unwrap();

        assert_eq!(graph.connector(c).unwrap().synapse_count(), 6);
        assert_eq!(graph.connector(own).unwrap().synapse_count(), 2);
        assert_eq!(graph.layer(a).unwrap().target_connectors(), &[c]);
        assert_eq!(graph.layer(b).unwrap().source_connectors(), &[c, own]);
        assert_eq!(graph.layer(b).unwrap().target_connectors(), &[own]);
        //нейрон 3 (первый в b): 3 входа от a и 1 от соседа
        assert_eq!(graph.neurons()[3].source_synapses().len(), 4);
        assert_eq!(graph.source_synapses_of(3, c).unwrap().count(), 3);
        assert_eq!(graph.target_synapses_of(0, c).unwrap().count(), 2);
        assert!(matches!(graph.source_synapses_of(99, c), Err(NetworkError::Validation(_))));
        assert!(matches!(graph.target_synapses_of(99, c), Err(NetworkError::Validation(_))));
        assert!(graph.source_synapses_of(3, ConnectorId(9)).is_err());

        //память под такой слой не выделить
        assert!(matches!(
            graph.add_layer(LayerTopology::linear(usize::MAX)),
            Err(NetworkError::Validation(_))
        ));
        assert_eq!(graph.layer_ids().count(), 2);
    }

    #[test]
    fn failed_connect_leaves_graph_untouched() {
        let mut graph = Graph::new();
        let a = graph.add_layer(LayerTopology::linear(3)).unwrap();
        let b = graph.add_layer(LayerTopology::sigmoid(2)).unwrap();
        let err = graph.connect(a, b, ConnectionMode::OneToOne).unwrap_err();
        assert!(matches!(err, NetworkError::Configuration(_)));
        assert_eq!(graph.synapses().len(), 0);
        assert!(graph.layer(a).unwrap().target_connectors().is_empty());
        assert!(graph.layer(b).unwrap().source_connectors().is_empty());
        assert!(matches!(
            graph.connect(a, LayerId(7), ConnectionMode::AllToAll),
            Err(NetworkError::Validation(_))
        ));
    }

    #[test]
    fn forward() {
        let mut graph = Graph::new();
        let a = graph.add_layer(LayerTopology::linear(2)).unwrap();
        let b = graph.add_layer(LayerTopology::sigmoid(1).with_bias(0.5)).unwrap();
        let c = graph.connect(a, b, ConnectionMode::AllToAll).unwrap();
        graph.set_weights(c, &[0.2, -0.4]).unwrap();

        graph.set_input(a, &[1.0, 2.0]).unwrap();
        graph.run_all().unwrap();
        assert_eq!(graph.output(a).unwrap(), vec![1.0, 2.0]);
        //0.5 + 0.2*1 - 0.4*2 = -0.1
        assert_relative_eq!(graph.output(b).unwrap()[0], 1.0 / (1.0 + 0.1f64.exp()));

        assert!(matches!(graph.set_input(a, &[1.0]), Err(NetworkError::Validation(_))));
        assert!(matches!(graph.set_errors(b, &[1.0, 0.0]), Err(NetworkError::Validation(_))));
    }

    #[test]
    fn backward_and_learn() {
        let mut graph = Graph::new();
        let a = graph.add_layer(LayerTopology::linear(1)).unwrap();
        let b = graph.add_layer(LayerTopology::linear(1).with_initializer(None)).unwrap();
        let o = graph.add_layer(LayerTopology::sigmoid(1)).unwrap();
        let ab = graph.connect(a, b, ConnectionMode::AllToAll).unwrap();
        let bo = graph.connect(b, o, ConnectionMode::AllToAll).unwrap();
        graph.set_weights(ab, &[0.5]).unwrap();
        graph.set_weights(bo, &[2.0]).unwrap();
        for l in [a, b, o] {
            graph.set_learning_rate(l, LearningRateFunction::constant(0.1)).unwrap();
        }

        graph.set_input(a, &[1.0]).unwrap();
        graph.run_all().unwrap();
        let out = graph.output(o).unwrap()[0];
        assert_relative_eq!(out, 1.0 / (1.0 + (-1.0f64).exp()));

        let sse = graph.set_errors(o, &[1.0]).unwrap();
        assert_relative_eq!(sse, (1.0 - out).powi(2));
        graph.evaluate_errors_all().unwrap();
        let e_o = (1.0 - out) * out * (1.0 - out);
        assert_relative_eq!(graph.errors(o).unwrap()[0], e_o);
        assert_relative_eq!(graph.errors(b).unwrap()[0], 2.0 * e_o);

        graph.learn_all(0, 1).unwrap();
        //b - линейный: смещение заморожено
        assert_eq!(graph.biases(b).unwrap(), vec![0.0]);
        assert_relative_eq!(graph.biases(o).unwrap()[0], 0.1 * e_o);
        assert_relative_eq!(graph.weights(bo).unwrap()[0], 2.0 + 0.1 * e_o * 0.5);
        assert_relative_eq!(graph.weights(ab).unwrap()[0], 0.5 + 0.1 * 2.0 * e_o * 1.0);
        assert!(matches!(graph.learn(o, 1, 1), Err(NetworkError::Validation(_))));
    }

    #[test]
    fn recurrent_reads_previous_step() {
        let mut graph = Graph::new();
        let a = graph.add_layer(LayerTopology::linear(2)).unwrap();
        let m = graph.add_layer(LayerTopology::linear(2)).unwrap();
        let c = graph.connect(a, m, ConnectionMode::OneToOne).unwrap();
        let own = graph.connect(m, m, ConnectionMode::AllToElse).unwrap();
        graph.set_weights(c, &[1.0, 1.0]).unwrap();
        graph.set_weights(own, &[1.0, 1.0]).unwrap();

        graph.set_input(a, &[1.0, 2.0]).unwrap();
        graph.run_all().unwrap();
        assert_eq!(graph.output(m).unwrap(), vec![1.0, 2.0]);
        graph.run_all().unwrap();
        //каждый получает выход соседа с прошлого шага
        assert_eq!(graph.output(m).unwrap(), vec![3.0, 3.0]);
    }

    #[test]
    fn jitter() {
        let mut rng = ChaCha8Rng::from_seed(Default::default());
        let mut graph = Graph::new();
        let a = graph.add_layer(LayerTopology::linear(3)).unwrap();
        let b = graph.add_layer(LayerTopology::tanh(3)).unwrap();
        let c = graph.connect(a, b, ConnectionMode::AllToAll).unwrap();
        graph.initialize(&mut rng).unwrap();
        let before = graph.weights(c).unwrap();
        let biases = graph.biases(b).unwrap();

        graph.jitter(c, 0.0, &mut rng).unwrap();
        assert_eq!(graph.weights(c).unwrap(), before);

        graph.jitter(c, 0.1, &mut rng).unwrap();
        let after = graph.weights(c).unwrap();
        assert_ne!(after, before);
        assert!(before.iter().zip(&after).all(|(x, y)| (x - y).abs() <= 0.1));
        assert_eq!(graph.biases(b).unwrap(), biases);
        assert!(graph.jitter(c, -1.0, &mut rng).is_err());
    }

    #[test]
    fn gating_is_unsupported() {
        let mut graph = Graph::new();
        let a = graph.add_layer(LayerTopology::sigmoid(2)).unwrap();
        let c = graph.connect(a, a, ConnectionMode::OneToOne).unwrap();
        assert!(matches!(
            graph.gate(c, a, GateType::OneToOne),
            Err(NetworkError::UnsupportedOperation(_))
        ));
    }
}
