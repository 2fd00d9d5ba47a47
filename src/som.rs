use crate::*;

/// Параметры обучения карты
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SomParameters {
    pub epochs: usize,
    pub learning_rate: LearningRateFunction,
}

impl Default for SomParameters {
    fn default() -> Self {
        Self {
            epochs: 500,
            learning_rate: LearningRateFunction::default(),
        }
    }
}

impl SomParameters {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NetworkError::validation("epochs should be positive"));
        }
        let rates = [self.learning_rate.initial_rate(), self.learning_rate.final_rate()];
        if rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(NetworkError::validation(format!(
                "invalid learning rate schedule {:?}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let parameters: SomParameters = serde_yaml::from_str(yaml)
            .map_err(|e| NetworkError::validation(format!("som parameters: {e}")))?;
        parameters.validate()?;
        Ok(parameters)
    }
}

/// Самоорганизующаяся карта: линейный входной слой и слой Кохонена
#[derive(Clone, Debug)]
pub struct SelfOrganizingMap {
    graph: Graph,
    input_layer: LayerId,
    kohonen: KohonenLayer,
}

impl SelfOrganizingMap {
    pub fn new(
        input_size: usize,
        lattice: Lattice,
        neighborhood: NeighborhoodFunction,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        let mut graph = Graph::new();
        let input_layer = graph.add_layer(LayerTopology::linear(input_size))?;
        let mut kohonen = KohonenLayer::new(&mut graph, lattice, neighborhood)?;
        kohonen.connect(&mut graph, input_layer)?;
        graph.initialize(rng)?;
        info!(
            "som built: {input_size} inputs, {}x{} {:?} lattice",
            lattice.width, lattice.height, lattice.topology
        );
        Ok(Self {
            graph,
            input_layer,
            kohonen,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn kohonen(&self) -> &KohonenLayer {
        &self.kohonen
    }

    pub fn input_size(&self) -> usize {
        self.graph.layers[self.input_layer.0].neuron_count()
    }

    pub fn winner(&self) -> Option<&PositionNeuron> {
        self.kohonen.winner()
    }

    pub fn present(&mut self, input: &[f64]) -> Result<Coordinate> {
        self.kohonen.present(&mut self.graph, input)
    }

    pub fn update_neighborhood(&mut self, iteration: usize, epochs: usize) -> Result<()> {
        self.kohonen.update_neighborhood(iteration, epochs)
    }

    pub fn learn(&mut self, iteration: usize, epochs: usize) -> Result<()> {
        self.kohonen.learn(&mut self.graph, iteration, epochs)
    }

    /// Веса нейрона карты с координатой `at`
    pub fn weights_at(&self, at: Coordinate) -> Result<Vec<f64>> {
        let connector = self.connector()?;
        let position = self
            .kohonen
            .positions()
            .iter()
            .find(|p| p.coordinate == at)
            .ok_or_else(|| NetworkError::validation(format!("{at:?} is outside the lattice")))?;
        Ok(self
            .graph
            .source_synapses_of(position.neuron, connector)?
            .map(|s| self.graph.synapses[s].weight)
            .collect())
    }

    /// Эпохи: для каждого примера present -> соседство -> обучение
    pub fn train(&mut self, set: &TrainingSet, parameters: &SomParameters) -> Result<()> {
        parameters.validate()?;
        if set.is_empty() {
            return Err(NetworkError::validation("training set is empty"));
        }
        check_len("training set input", set.input_size(), self.input_size())?;
        self.kohonen.set_learning_rate(&mut self.graph, parameters.learning_rate)?;
        info!("som training on {} samples for {} epochs", set.len(), parameters.epochs);
        for i in 0..parameters.epochs {
            for sample in set.iter() {
                self.present(sample.input())?;
                self.update_neighborhood(i, parameters.epochs)?;
                self.learn(i, parameters.epochs)?;
            }
            if i % 100 == 0 {
                trace!("som epoch {i}: last winner {:?}", self.winner().map(|w| w.coordinate));
            }
        }
        Ok(())
    }

    /// Шум на веса карты
    pub fn jitter(&mut self, limit: f64, rng: &mut dyn RngCore) -> Result<()> {
        let connector = self.connector()?;
        self.graph.jitter(connector, limit, rng)
    }

    fn connector(&self) -> Result<ConnectorId> {
        self.kohonen
            .connector()
            .ok_or_else(|| NetworkError::configuration("som has no kohonen connector"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn clusters() -> TrainingSet {
        let mut set = TrainingSet::new(2, 0).unwrap();
        for input in [[0.05, 0.05], [0.1, 0.0], [0.0, 0.1], [0.95, 0.9], [0.9, 1.0], [1.0, 0.95]] {
            set.add(TrainingSample::unsupervised(&input).unwrap()).unwrap();
        }
        set
    }

    #[test]
    fn initial_weights_in_unit_interval() {
        let mut rng = ChaCha8Rng::from_seed(Default::default());
        let lattice = Lattice::new(3, 3).unwrap();
        let som = SelfOrganizingMap::new(4, lattice, NeighborhoodFunction::gaussian(1.0).unwrap(), &mut rng).unwrap();
        assert_eq!(som.input_size(), 4);
        assert!(som.winner().is_none());
        let weights = som.weights_at(Coordinate::new(2, 2)).unwrap();
        assert_eq!(weights.len(), 4);
        assert!(weights.iter().all(|w| (0.0..=1.0).contains(w)));
        assert!(som.weights_at(Coordinate::new(3, 0)).is_err());
    }

    #[test]
    fn separates_clusters() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let lattice = Lattice::new(4, 1).unwrap();
        let mut som = SelfOrganizingMap::new(2, lattice, NeighborhoodFunction::gaussian(1.0).unwrap(), &mut rng).unwrap();
        //концы линии ближе к разным кластерам
        let connector = som.kohonen().connector().unwrap();
        som.graph_mut()
            .set_weights(connector, &[0.3, 0.3, 0.45, 0.45, 0.55, 0.55, 0.7, 0.7])
            .unwrap();
        let parameters = SomParameters {
            epochs: 200,
            ..Default::default()
        };
        som.train(&clusters(), &parameters).unwrap();

        let low = som.present(&[0.05, 0.05]).unwrap();
        let high = som.present(&[0.95, 0.95]).unwrap();
        assert_ne!(low, high);
        let w = som.weights_at(low).unwrap();
        assert!(w.iter().all(|&x| x < 0.3));
        let w = som.weights_at(high).unwrap();
        assert!(w.iter().all(|&x| x > 0.7));
    }

    #[test]
    fn train_checks_input() {
        let mut rng = ChaCha8Rng::from_seed(Default::default());
        let lattice = Lattice::new(2, 2).unwrap().hexagonal().circular(true, true);
        let mut som = SelfOrganizingMap::new(3, lattice, NeighborhoodFunction::mexican_hat(1.0).unwrap(), &mut rng).unwrap();
        assert!(som.train(&clusters(), &SomParameters::default()).is_err());
        let empty = TrainingSet::new(3, 0).unwrap();
        assert!(som.train(&empty, &SomParameters::default()).is_err());
        let zero = SomParameters {
            epochs: 0,
            ..Default::default()
        };
        let mut one = TrainingSet::new(3, 0).unwrap();
        one.add(TrainingSample::unsupervised(&[0.1, 0.2, 0.3]).unwrap()).unwrap();
        assert!(matches!(som.train(&one, &zero), Err(NetworkError::Validation(_))));
        som.train(&one, &SomParameters { epochs: 3, ..Default::default() }).unwrap();
        assert!(som.winner().is_some());
    }

    #[test]
    fn jitter_zero_keeps_weights() {
        let mut rng = ChaCha8Rng::from_seed(Default::default());
        let lattice = Lattice::new(2, 3).unwrap();
        let mut som = SelfOrganizingMap::new(2, lattice, NeighborhoodFunction::gaussian(2.0).unwrap(), &mut rng).unwrap();
        let connector = som.kohonen().connector().unwrap();
        let before = som.graph().weights(connector).unwrap();
        som.jitter(0.0, &mut rng).unwrap();
        assert_eq!(som.graph().weights(connector).unwrap(), before);
        som.jitter(0.01, &mut rng).unwrap();
        let after = som.graph().weights(connector).unwrap();
        for (a, b) in after.iter().zip(&before) {
            assert_relative_eq!(*a, *b, epsilon = 0.01 + 1e-12);
        }
        assert!(som.jitter(-1.0, &mut rng).is_err());
    }

    #[test]
    fn parameters_from_yaml() {
        let p = SomParameters::from_yaml_str("epochs: 50\nlearning_rate: !Hyperbolic\n  initial: 0.5\n  final_rate: 0.01\n").unwrap();
        assert_eq!(p.epochs, 50);
        assert_eq!(p.learning_rate, LearningRateFunction::hyperbolic(0.5, 0.01));
        assert_eq!(SomParameters::from_yaml_str("{}").unwrap(), SomParameters::default());
        assert!(SomParameters::from_yaml_str("epochs: 0").is_err());
    }
}
