use crate::*;

/// Форма решётки карты
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatticeTopology {
    #[default]
    Rectangular,
    /// Нечётные ряды сдвинуты на полшага
    Hexagonal,
}

/// Позиция нейрона на решётке
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Решётка width x height; каждая ось может быть замкнута в кольцо
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lattice {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub topology: LatticeTopology,
    #[serde(default)]
    pub row_circular: bool,
    #[serde(default)]
    pub column_circular: bool,
}

impl Lattice {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let lattice = Self {
            width,
            height,
            topology: LatticeTopology::Rectangular,
            row_circular: false,
            column_circular: false,
        };
        lattice.validate()?;
        Ok(lattice)
    }

    pub fn hexagonal(mut self) -> Self {
        self.topology = LatticeTopology::Hexagonal;
        self
    }

    pub fn circular(mut self, rows: bool, columns: bool) -> Self {
        self.row_circular = rows;
        self.column_circular = columns;
        self
    }

    /// Для решётки, не прошедшей проверку размера, насыщается на usize::MAX
    pub fn neuron_count(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Нейрон i лежит в (i mod width, i div width)
    pub fn coordinate(&self, index: usize) -> Coordinate {
        Coordinate::new(index % self.width, index / self.width)
    }

    /// Квадрат расстояния на решётке от победителя до нейрона
    pub fn squared_distance(&self, winner: Coordinate, neuron: Coordinate) -> f64 {
        let mut dx = winner.x.abs_diff(neuron.x);
        let mut dy = winner.y.abs_diff(neuron.y);
        if self.row_circular {
            dx = dx.min(self.width - dx);
        }
        if self.column_circular {
            dy = dy.min(self.height - dy);
        }
        let odd_row = dy % 2 == 1;
        let (dx, dy) = (dx as f64, dy as f64);
        let mut dx_square = dx * dx;
        let mut dy_square = dy * dy;
        if self.topology == LatticeTopology::Hexagonal {
            //(dx ± 0.5)²: знак зависит от чётности ряда победителя
            if odd_row {
                let shift = if (neuron.x > winner.x) == (winner.y % 2 == 0) { dx } else { -dx };
                dx_square += 0.25 + shift;
            }
            dy_square *= 0.75;
        }
        dx_square + dy_square
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(NetworkError::validation(format!(
                "lattice {}x{} should have positive size",
                self.width, self.height
            )));
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(NetworkError::validation(format!(
                "lattice {}x{} is too large",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Нейрон карты: номер в арене графа, позиция и текущее значение функции соседства
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionNeuron {
    pub neuron: usize,
    pub coordinate: Coordinate,
    pub neighborhood_value: f64,
}

/// Слой Кохонена поверх слоя графа. Выход нейрона - евклидово расстояние
/// от вектора его весов до входа.
#[derive(Clone, Debug)]
pub struct KohonenLayer {
    layer: LayerId,
    lattice: Lattice,
    neighborhood: NeighborhoodFunction,
    positions: Vec<PositionNeuron>,
    connector: Option<ConnectorId>,
    winner: Option<usize>,
}

impl KohonenLayer {
    pub fn new(graph: &mut Graph, lattice: Lattice, neighborhood: NeighborhoodFunction) -> Result<Self> {
        lattice.validate()?;
        neighborhood.validate()?;
        let layer = graph.add_layer(LayerTopology::linear(lattice.neuron_count()))?;
        let positions = graph
            .layer(layer)?
            .neurons()
            .enumerate()
            .map(|(i, neuron)| PositionNeuron {
                neuron,
                coordinate: lattice.coordinate(i),
                neighborhood_value: 0.0,
            })
            .collect();
        Ok(Self {
            layer,
            lattice,
            neighborhood,
            positions,
            connector: None,
            winner: None,
        })
    }

    /// Единственный входной коннектор, каждый с каждым; веса по умолчанию случайные из [0, 1)
    pub fn connect(&mut self, graph: &mut Graph, source: LayerId) -> Result<ConnectorId> {
        if let Some(existing) = self.connector {
            return Err(NetworkError::configuration(format!(
                "kohonen layer {} is already connected by connector {}",
                self.layer.0, existing.0
            )));
        }
        let connector = graph.build_connector(
            source,
            self.layer,
            ConnectionMode::AllToAll,
            ConnectorKind::Kohonen,
            Some(Initializer::Random { min: 0.0, max: 1.0 }),
        )?;
        self.connector = Some(connector);
        Ok(connector)
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn neighborhood(&self) -> &NeighborhoodFunction {
        &self.neighborhood
    }

    pub fn positions(&self) -> &[PositionNeuron] {
        &self.positions
    }

    pub fn connector(&self) -> Option<ConnectorId> {
        self.connector
    }

    /// Победитель последнего `present`
    pub fn winner(&self) -> Option<&PositionNeuron> {
        self.winner.map(|w| &self.positions[w])
    }

    pub fn set_learning_rate(&self, graph: &mut Graph, function: LearningRateFunction) -> Result<()> {
        graph.set_learning_rate(self.layer, function)
    }

    fn source_connector(&self) -> Result<ConnectorId> {
        self.connector.ok_or_else(|| {
            NetworkError::configuration(format!("kohonen layer {} has no source connector", self.layer.0))
        })
    }

    /// Подать вектор на входной слой, посчитать расстояния и выбрать победителя
    /// (при равенстве - первый по порядку)
    pub fn present(&mut self, graph: &mut Graph, input: &[f64]) -> Result<Coordinate> {
        let connector = self.source_connector()?;
        let source = graph.connector(connector)?.source_layer();
        graph.set_input(source, input)?;
        graph.run(source)?;
        graph.run(self.layer)?;
        let distances = graph.output(self.layer)?;
        let winner = distances
            .iter()
            .position_min_by(|a, b| a.total_cmp(b))
            .ok_or_else(|| NetworkError::validation("kohonen layer has no neurons"))?;
        self.winner = Some(winner);
        trace!("kohonen layer {}: winner {:?}", self.layer.0, self.positions[winner].coordinate);
        Ok(self.positions[winner].coordinate)
    }

    /// Значения функции соседства относительно текущего победителя
    pub fn update_neighborhood(&mut self, iteration: usize, epochs: usize) -> Result<()> {
        let winner = self
            .winner()
            .ok_or_else(|| NetworkError::validation("no winner yet: present an input first"))?
            .coordinate;
        let sigma = self.neighborhood.current_sigma(iteration, epochs)?;
        for p in &mut self.positions {
            let d = self.lattice.squared_distance(winner, p.coordinate);
            p.neighborhood_value = self.neighborhood.value(d, sigma);
        }
        Ok(())
    }

    /// w += rate(i, N) * h * (выход источника - w)
    pub fn learn(&self, graph: &mut Graph, iteration: usize, epochs: usize) -> Result<()> {
        let connector = self.source_connector()?;
        let rate = graph.layer(self.layer)?.learning_rate().rate(iteration, epochs)?;
        let Graph { neurons, synapses, .. } = graph;
        for p in &self.positions {
            for &s in &neurons[p.neuron].source_synapses {
                if synapses[s].connector == connector.0 {
                    synapses[s].optimize_toward_source(neurons, rate * p.neighborhood_value);
                }
            }
        }
        Ok(())
    }
}
