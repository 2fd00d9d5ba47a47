use crate::*;

/// Способ начальной установки смещений (для слоя) и весов (для коннектора)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Initializer {
    /// Все значения = 0
    Zero,
    /// Все значения = c
    Constant(f64),
    /// Независимые равномерные значения из [min, max]
    Random { min: f64, max: f64 },
    /// Случайный вектор единичной длины
    NormalizedRandom,
    /// Инициализация Нгуена-Уидроу
    NguyenWidrow { output_range: f64 },
}

impl Default for Initializer {
    fn default() -> Self {
        Initializer::NguyenWidrow { output_range: 1.0 }
    }
}

impl Initializer {
    /// Равномерное распределение с проверкой границ
    pub fn uniform(min: f64, max: f64) -> Result<Self> {
        let initializer = Initializer::Random { min, max };
        initializer.validate()?;
        Ok(initializer)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Initializer::Zero | Initializer::NormalizedRandom => Ok(()),
            Initializer::Constant(c) if c.is_finite() => Ok(()),
            Initializer::Constant(_) => Err(NetworkError::validation("constant is not a finite number")),
            Initializer::Random { min, max } => {
                if !(min.is_finite() && max.is_finite()) || min > max {
                    return Err(NetworkError::validation(format!(
                        "invalid random range [{min}, {max}]"
                    )));
                }
                Ok(())
            }
            Initializer::NguyenWidrow { output_range } => {
                if !output_range.is_finite() || output_range <= 0.0 {
                    return Err(NetworkError::validation("output range should be positive"));
                }
                Ok(())
            }
        }
    }

    /// Смещения нейронов слоя
    pub fn initialize_layer(&self, graph: &mut Graph, layer: LayerId, rng: &mut dyn RngCore) -> Result<()> {
        self.validate()?;
        let neurons = graph.layer(layer)?.neurons();
        let count = neurons.len();
        let biases: Vec<f64> = match *self {
            Initializer::Zero => vec![0.0; count],
            Initializer::Constant(c) => vec![c; count],
            Initializer::Random { min, max } => (0..count).map(|_| rng.gen_range(min..=max)).collect(),
            Initializer::NormalizedRandom => random_vector(rng, count, 1.0),
            Initializer::NguyenWidrow { output_range } => {
                //сумма нейронов всех слоёв, куда ведёт этот слой
                let hidden: usize = graph
                    .layer(layer)?
                    .target_connectors()
                    .iter()
                    .map(|&c| graph.connector(c).and_then(|c| graph.layer(c.target_layer())))
                    .map_ok(|l| l.neuron_count())
                    .sum::<Result<usize>>()?;
                let factor = nguyen_widrow_factor(count, hidden, output_range);
                (0..count).map(|_| rng.gen_range(-factor..=factor)).collect()
            }
        };
        for (neuron, bias) in neurons.zip_eq(biases) {
            graph.neurons[neuron].bias = bias;
        }
        Ok(())
    }

    /// Веса синапсов коннектора
    pub fn initialize_connector(&self, graph: &mut Graph, connector: ConnectorId, rng: &mut dyn RngCore) -> Result<()> {
        self.validate()?;
        let (synapses, source, target) = {
            let c = graph.connector(connector)?;
            (c.synapses(), c.source_layer(), c.target_layer())
        };
        match *self {
            Initializer::Zero | Initializer::Constant(_) => {
                let c = if let Initializer::Constant(c) = *self { c } else { 0.0 };
                for s in synapses {
                    graph.synapses[s].weight = c;
                }
            }
            Initializer::Random { min, max } => {
                for s in synapses {
                    graph.synapses[s].weight = rng.gen_range(min..=max);
                }
            }
            Initializer::NormalizedRandom => {
                let weights = random_vector(rng, synapses.len(), 1.0);
                for (s, w) in synapses.zip_eq(weights) {
                    graph.synapses[s].weight = w;
                }
            }
            Initializer::NguyenWidrow { output_range } => {
                let inputs = graph.layer(source)?.neuron_count();
                let targets = graph.layer(target)?.neurons();
                let factor = nguyen_widrow_factor(inputs, targets.len(), output_range);
                //для каждого целевого нейрона свой вектор в порядке его входных синапсов
                for neuron in targets {
                    let own: Vec<usize> = graph.source_synapses_of(neuron, connector)?.collect();
                    let weights = random_vector(rng, own.len(), factor);
                    for (s, w) in own.into_iter().zip_eq(weights) {
                        graph.synapses[s].weight = w;
                    }
                }
            }
        }
        Ok(())
    }
}

/// 0.7 * hidden^(1/input) / output_range
pub fn nguyen_widrow_factor(input_neurons: usize, hidden_neurons: usize, output_range: f64) -> f64 {
    0.7 * (hidden_neurons as f64).powf(1.0 / input_neurons as f64) / output_range
}

/// Равномерный случайный вектор, растянутый до длины `magnitude`
pub fn random_vector(rng: &mut dyn RngCore, size: usize, magnitude: f64) -> Vec<f64> {
    let v: Vec<f64> = (0..size).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm == 0.0 {
        return v;
    }
    v.into_iter().map(|x| x * magnitude / norm).collect()
}
