use crate::*;

/// Дополнительные рекуррентные связи LSTM
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LstmOptions {
    /// Ячейка памяти -> вентили своего блока
    pub hidden_to_hidden: bool,
    /// Выходной слой -> ячейка памяти
    pub output_to_hidden: bool,
    /// Выходной слой -> все три вентиля
    pub output_to_gates: bool,
    /// Входной слой -> выходной слой напрямую
    pub input_to_output: bool,
    /// Управление синапсами вентилями (не реализовано, построение завершится ошибкой)
    pub gated: bool,
}

/// Блок памяти: три вентиля и ячейка
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryBlock {
    pub input_gate: LayerId,
    pub forget_gate: LayerId,
    pub memory_cell: LayerId,
    pub output_gate: LayerId,
}

/// Частичная LSTM: блоки памяти без управления вентилями
#[derive(Clone, Debug)]
pub struct Lstm {
    network: Network,
    blocks: Vec<MemoryBlock>,
}

impl Lstm {
    /// `sizes[0]` - входы, `sizes[last]` - выходы, между ними - размеры блоков памяти
    pub fn new(options: LstmOptions, sizes: &[usize], rng: &mut dyn RngCore) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(NetworkError::validation("lstm needs at least input and output sizes"));
        }
        if options.gated {
            return Err(NetworkError::unsupported("gated memory blocks are not implemented"));
        }
        let mut graph = Graph::new();
        let input = graph.add_layer(LayerTopology::linear(sizes[0]))?;

        //вентили блока идут раньше ячейки: связи ячейка -> вентили рекуррентны;
        //выходной слой - последним
        let mut blocks: Vec<MemoryBlock> = Vec::new();
        for &size in &sizes[1..sizes.len() - 1] {
            let gate = || LayerTopology::sigmoid(size).fixed_bias_value(1.0);
            let block = MemoryBlock {
                input_gate: graph.add_layer(gate())?,
                forget_gate: graph.add_layer(gate())?,
                output_gate: graph.add_layer(gate())?,
                memory_cell: graph.add_layer(LayerTopology::sigmoid(size))?,
            };
            //от входного слоя
            graph.connect(input, block.memory_cell, ConnectionMode::AllToAll)?;
            for g in block.gates() {
                graph.connect(input, g, ConnectionMode::AllToAll)?;
            }
            //от ячейки предыдущего блока
            if let Some(previous) = blocks.last() {
                graph.connect(previous.memory_cell, block.memory_cell, ConnectionMode::AllToAll)?;
                for g in block.gates() {
                    graph.connect(previous.memory_cell, g, ConnectionMode::AllToAll)?;
                }
            }
            //самосвязь ячейки
            graph.connect(block.memory_cell, block.memory_cell, ConnectionMode::AllToElse)?;
            if options.hidden_to_hidden {
                for g in block.gates() {
                    graph.connect(block.memory_cell, g, ConnectionMode::AllToAll)?;
                }
            }
            blocks.push(block);
        }

        let output = graph.add_layer(LayerTopology::sigmoid(sizes[sizes.len() - 1]))?;
        for block in &blocks {
            graph.connect(block.memory_cell, output, ConnectionMode::AllToAll)?;
            if options.output_to_hidden {
                graph.connect(output, block.memory_cell, ConnectionMode::AllToAll)?;
            }
            if options.output_to_gates {
                for g in block.gates() {
                    graph.connect(output, g, ConnectionMode::AllToAll)?;
                }
            }
        }
        if options.input_to_output || blocks.is_empty() {
            graph.connect(input, output, ConnectionMode::AllToAll)?;
        }
        graph.initialize(rng)?;
        info!("lstm {:?} built: {} memory blocks", sizes, blocks.len());
        Ok(Self {
            network: Network::new(graph, input, output)?,
            blocks,
        })
    }

    pub fn blocks(&self) -> &[MemoryBlock] {
        &self.blocks
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

impl MemoryBlock {
    pub fn gates(&self) -> [LayerId; 3] {
        [self.input_gate, self.forget_gate, self.output_gate]
    }
}
