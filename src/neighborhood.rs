use crate::*;

/// Функция соседства карты Кохонена. `sigma` - начальная ширина, к концу обучения
/// она равномерно уменьшается до нуля.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum NeighborhoodFunction {
    /// exp(-d / 2σ²)
    Gaussian { sigma: f64 },
    /// (1 - d/σ²) exp(-d / 2σ²)
    MexicanHat { sigma: f64 },
}

impl NeighborhoodFunction {
    /// Полная ширина на половине высоты равна диаметру обучения: r = 1.17741 σ
    pub fn gaussian(learning_radius: f64) -> Result<Self> {
        check_radius(learning_radius)?;
        Ok(Self::Gaussian {
            sigma: learning_radius / 1.17741,
        })
    }

    /// r = 0.6259 σ
    pub fn mexican_hat(learning_radius: f64) -> Result<Self> {
        check_radius(learning_radius)?;
        Ok(Self::MexicanHat {
            sigma: learning_radius / 0.6259,
        })
    }

    pub fn sigma(&self) -> f64 {
        match *self {
            Self::Gaussian { sigma } | Self::MexicanHat { sigma } => sigma,
        }
    }

    /// σ на итерации `iteration` из `epochs`: σ(1 - i/N)
    pub fn current_sigma(&self, iteration: usize, epochs: usize) -> Result<f64> {
        check_iteration(iteration, epochs)?;
        let sigma = self.sigma();
        Ok(sigma - sigma * iteration as f64 / epochs as f64)
    }

    /// Значение при квадрате расстояния до победителя `squared_distance` и ширине `sigma`
    pub fn value(&self, squared_distance: f64, sigma: f64) -> f64 {
        match self {
            Self::Gaussian { .. } => (-squared_distance / (2.0 * sigma * sigma)).exp(),
            Self::MexicanHat { .. } => {
                //добавка держит знаменатель ненулевым
                let scaled = squared_distance / (sigma * sigma + 1e-9);
                (1.0 - scaled) * (-scaled / 2.0).exp()
            }
        }
    }

    pub fn evaluate(&self, squared_distance: f64, iteration: usize, epochs: usize) -> Result<f64> {
        Ok(self.value(squared_distance, self.current_sigma(iteration, epochs)?))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let sigma = self.sigma();
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(NetworkError::validation(format!(
                "neighborhood sigma should be positive, got {sigma}"
            )));
        }
        Ok(())
    }
}

fn check_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(NetworkError::validation(format!(
            "learning radius should be positive, got {radius}"
        )));
    }
    Ok(())
}
