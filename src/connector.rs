use crate::*;

/// Номер коннектора в графе
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectorId(pub usize);

/// Правило построения синапсов между слоями
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionMode {
    /// Каждый с каждым: |source| * |target| синапсов
    #[default]
    AllToAll,
    /// i-й с i-м, размеры слоёв должны совпадать
    OneToOne,
    /// Каждый с каждым, кроме нейрона с самим собой
    AllToElse,
}

/// Вид коннектора: обратное распространение или карта Кохонена
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorKind {
    Backpropagation,
    Kohonen,
}

/// Момент по умолчанию
pub const DEFAULT_MOMENTUM: f64 = 0.07;

/// Коннектор владеет непрерывным диапазоном синапсов арены
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    pub(crate) source_layer: LayerId,
    pub(crate) target_layer: LayerId,
    pub(crate) mode: ConnectionMode,
    pub(crate) kind: ConnectorKind,
    pub(crate) synapses: Range<usize>,
    pub(crate) momentum: f64,
    pub(crate) initializer: Option<Initializer>,
}

impl Connector {
    pub fn source_layer(&self) -> LayerId {
        self.source_layer
    }

    pub fn target_layer(&self) -> LayerId {
        self.target_layer
    }

    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    pub fn kind(&self) -> ConnectorKind {
        self.kind
    }

    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    /// Номера синапсов коннектора в арене
    pub fn synapses(&self) -> Range<usize> {
        self.synapses.clone()
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    pub fn initializer(&self) -> Option<Initializer> {
        self.initializer
    }
}

/// Пары (source, target) номеров нейронов в порядке построения синапсов:
/// снаружи цикл по целевым нейронам, внутри - по исходным.
pub fn connection_pairs(
    source: Range<usize>,
    target: Range<usize>,
    mode: ConnectionMode,
) -> Result<Vec<(usize, usize)>> {
    let pairs = match mode {
        ConnectionMode::AllToAll => iproduct!(target, source)
            .map(|(t, s)| (s, t))
            .collect(),
        ConnectionMode::OneToOne => {
            if source.len() != target.len() {
                return Err(NetworkError::configuration(format!(
                    "one-to-one connector cannot be formed between layers of {} and {} neurons",
                    source.len(),
                    target.len()
                )));
            }
            source.zip_eq(target).collect()
        }
        ConnectionMode::AllToElse => iproduct!(target, source)
            .filter(|(t, s)| t != s) //сам с собой не соединяем
            .map(|(t, s)| (s, t))
            .collect(),
    };
    Ok(pairs)
}
