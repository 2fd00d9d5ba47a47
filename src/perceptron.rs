use crate::*;

/// Многослойный персептрон: линейный вход, сигмоидные скрытые и выходной слои,
/// соседние слои соединены каждый с каждым.
#[derive(Clone, Debug)]
pub struct Perceptron {
    network: Network,
}

impl Perceptron {
    /// `sizes[0]` - входы, `sizes[last]` - выходы, между ними скрытые слои
    pub fn new(sizes: &[usize], rng: &mut dyn RngCore) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(NetworkError::validation(
                "perceptron needs at least input and output sizes",
            ));
        }
        let mut graph = Graph::new();
        let input = graph.add_layer(LayerTopology::linear(sizes[0]))?;
        let mut previous = input;
        for &hidden in &sizes[1..sizes.len() - 1] {
            let layer = graph.add_layer(LayerTopology::sigmoid(hidden))?;
            graph.connect(previous, layer, ConnectionMode::AllToAll)?;
            previous = layer;
        }
        let output = graph.add_layer(LayerTopology::sigmoid(sizes[sizes.len() - 1]))?;
        graph.connect(previous, output, ConnectionMode::AllToAll)?;
        graph.initialize(rng)?;
        info!("perceptron {:?} built", sizes);
        Ok(Self {
            network: Network::new(graph, input, output)?,
        })
    }

    pub fn run(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.network.run(input)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let mut rng = ChaCha8Rng::from_seed(Default::default());
        let perceptron = Perceptron::new(&[3, 4, 2, 1], &mut rng).unwrap();
        let graph = perceptron.network().graph();
        let kinds: Vec<_> = graph
            .layer_ids()
            .map(|l| graph.layer(l).unwrap().activation())
            .collect();
        assert_eq!(
            kinds,
            vec![Activation::Linear, Activation::Sigmoid, Activation::Sigmoid, Activation::Sigmoid]
        );
        let synapses: Vec<_> = graph
            .connector_ids()
            .map(|c| graph.connector(c).unwrap().synapse_count())
            .collect();
        assert_eq!(synapses, vec![12, 8, 2]);
        assert_eq!(perceptron.network().input_size(), 3);
        assert_eq!(perceptron.network().output_size(), 1);
        //вход линейный - смещения не инициализируются
        assert!(graph.biases(LayerId(0)).unwrap().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn bad_sizes() {
        let mut rng = ChaCha8Rng::from_seed(Default::default());
        assert!(matches!(Perceptron::new(&[3], &mut rng), Err(NetworkError::Validation(_))));
        assert!(matches!(Perceptron::new(&[3, 0, 1], &mut rng), Err(NetworkError::Validation(_))));
    }

    #[test]
    fn run_output_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut perceptron = Perceptron::new(&[2, 3, 2], &mut rng).unwrap();
        let out = perceptron.run(&[0.3, -0.7]).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|&y| y > 0.0 && y < 1.0));
    }
}
