//! Declarative control system description.
//!
//! A [`ControlSystemConfig`] names one element per slot and is read from TOML
//! through [`ConfigLoader`](kinetic_common::config::ConfigLoader). Every table
//! is optional and tagged by `kind`:
//!
//! ```toml
//! [feedback]
//! kind = "pid"
//! feedback_type = "position"
//! kp = 1.2
//! kd = 0.05
//!
//! [feedforward]
//! kind = "elevator"
//! kg = 0.3
//!
//! [[filter.position]]
//! kind = "low_pass"
//! alpha = 0.2
//!
//! [interpolator]
//! kind = "trapezoid"
//! max_vel = 1.5
//! accel = 3.0
//! ```

use kinetic_common::config::ConfigError;
use kinetic_common::time::Clock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::builder::{BoxedFeedback, FilterBuilder};
use crate::error::{ElementError, ElementResult, check_unit_gain};
use crate::feedback::{
    AngleType, AngularFeedback, BangBangElement, FeedbackElement, FeedbackType, NullFeedback,
    PidCoefficients, PidController, PidElement, SquidElement,
};
use crate::feedforward::{
    ArmFeedforward, BasicFeedforward, BasicFeedforwardParameters, ElevatorFeedforward,
    FeedforwardElement, GravityFeedforwardParameters, NullFeedforward,
};
use crate::filter::{Filter, FilterElement, LowPassParameters, MAX_CHAINED_FILTERS};
use crate::interpolator::{
    ConstantInterpolator, FirstOrderEmaInterpolator, FirstOrderEmaParameters,
    InterpolatorElement, TrapezoidInterpolator, TrapezoidProfileParameters,
};
use crate::system::ControlSystem;

impl From<ElementError> for ConfigError {
    fn from(err: ElementError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}

const fn default_true() -> bool {
    true
}

// ─── Feedback ───────────────────────────────────────────────────────

/// Feedback slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedbackConfig {
    /// No feedback.
    #[default]
    None,
    /// Linear PID.
    Pid {
        #[serde(default)]
        feedback_type: FeedbackType,
        #[serde(default)]
        kp: f64,
        #[serde(default)]
        ki: f64,
        #[serde(default)]
        kd: f64,
        #[serde(default = "default_true")]
        reset_integral_on_zero_crossover: bool,
    },
    /// Square-root-proportional PID.
    Squid {
        #[serde(default)]
        feedback_type: FeedbackType,
        #[serde(default)]
        kp: f64,
        #[serde(default)]
        ki: f64,
        #[serde(default)]
        kd: f64,
        #[serde(default = "default_true")]
        reset_integral_on_zero_crossover: bool,
    },
    /// Bang-bang.
    BangBang {
        #[serde(default)]
        feedback_type: FeedbackType,
    },
    /// Angle-normalizing wrapper around another feedback element.
    Angular {
        #[serde(default)]
        angle_type: AngleType,
        inner: Box<FeedbackConfig>,
    },
}

impl FeedbackConfig {
    fn element<C: Clock + Clone + 'static>(&self, clock: &C) -> Box<dyn FeedbackElement> {
        match self {
            Self::None => Box::new(NullFeedback),
            Self::Pid {
                feedback_type,
                kp,
                ki,
                kd,
                reset_integral_on_zero_crossover,
            } => {
                let controller = PidController::new(PidCoefficients::new(*kp, *ki, *kd))
                    .reset_integral_on_zero_crossover(*reset_integral_on_zero_crossover);
                Box::new(PidElement::from_controller(
                    *feedback_type,
                    controller,
                    clock.clone(),
                ))
            }
            Self::Squid {
                feedback_type,
                kp,
                ki,
                kd,
                reset_integral_on_zero_crossover,
            } => Box::new(
                SquidElement::new(
                    *feedback_type,
                    PidCoefficients::new(*kp, *ki, *kd),
                    clock.clone(),
                )
                .reset_integral_on_zero_crossover(*reset_integral_on_zero_crossover),
            ),
            Self::BangBang { feedback_type } => Box::new(BangBangElement::new(*feedback_type)),
            Self::Angular { angle_type, inner } => Box::new(AngularFeedback::new(
                *angle_type,
                BoxedFeedback(inner.element(clock)),
            )),
        }
    }
}

// ─── Feedforward ────────────────────────────────────────────────────

/// Feedforward slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedforwardConfig {
    /// No feedforward.
    #[default]
    None,
    /// Velocity, acceleration and static friction.
    Basic(BasicFeedforwardParameters),
    /// Basic model plus constant gravity.
    Elevator(GravityFeedforwardParameters),
    /// Basic model plus cosine-scaled gravity.
    Arm(GravityFeedforwardParameters),
}

impl FeedforwardConfig {
    fn element(&self) -> Box<dyn FeedforwardElement> {
        match self {
            Self::None => Box::new(NullFeedforward),
            Self::Basic(params) => Box::new(BasicFeedforward::new(*params)),
            Self::Elevator(params) => Box::new(ElevatorFeedforward::new(*params)),
            Self::Arm(params) => Box::new(ArmFeedforward::new(*params)),
        }
    }
}

// ─── Filters ────────────────────────────────────────────────────────

/// One stage of a channel's filter chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterStageConfig {
    /// Exponential low-pass.
    LowPass(LowPassParameters),
}

/// Filter stages per channel, applied in order. Empty channels pass through.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub position: Vec<FilterStageConfig>,
    pub velocity: Vec<FilterStageConfig>,
    pub acceleration: Vec<FilterStageConfig>,
}

impl FilterConfig {
    fn channels(&self) -> [(&'static str, &[FilterStageConfig]); 3] {
        [
            ("position", self.position.as_slice()),
            ("velocity", self.velocity.as_slice()),
            ("acceleration", self.acceleration.as_slice()),
        ]
    }

    fn check(&self) -> ElementResult<()> {
        for (_, stages) in self.channels() {
            if stages.len() > MAX_CHAINED_FILTERS {
                return Err(ElementError::FilterChainFull {
                    capacity: MAX_CHAINED_FILTERS,
                });
            }
            for stage in stages {
                match stage {
                    FilterStageConfig::LowPass(params) => {
                        check_unit_gain("low pass", params.alpha)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn channel(stages: &[FilterStageConfig]) -> ElementResult<Box<dyn Filter>> {
        stages
            .iter()
            .fold(FilterBuilder::new(), |builder, stage| match stage {
                FilterStageConfig::LowPass(params) => {
                    builder.low_pass(params.alpha, params.starting_estimate)
                }
            })
            .build()
    }

    fn element(&self) -> ElementResult<FilterElement> {
        Ok(FilterElement::new(
            Self::channel(&self.position)?,
            Self::channel(&self.velocity)?,
            Self::channel(&self.acceleration)?,
        ))
    }
}

// ─── Interpolator ───────────────────────────────────────────────────

/// Interpolator slot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterpolatorConfig {
    /// Reference equals the goal.
    #[default]
    Constant,
    /// Exponential moving average toward the goal.
    Ema(FirstOrderEmaParameters),
    /// Trapezoid motion profile; `decel` defaults to `accel`.
    Trapezoid {
        max_vel: f64,
        accel: f64,
        #[serde(default)]
        decel: Option<f64>,
    },
}

impl InterpolatorConfig {
    fn profile(
        max_vel: f64,
        accel: f64,
        decel: Option<f64>,
    ) -> ElementResult<TrapezoidProfileParameters> {
        TrapezoidProfileParameters::new(max_vel, accel, decel.unwrap_or(accel))
    }

    fn check(&self) -> ElementResult<()> {
        match *self {
            Self::Constant => Ok(()),
            Self::Ema(params) => check_unit_gain("ema", params.alpha).map(drop),
            Self::Trapezoid {
                max_vel,
                accel,
                decel,
            } => Self::profile(max_vel, accel, decel).map(drop),
        }
    }

    fn element<C: Clock + 'static>(&self, clock: C) -> ElementResult<Box<dyn InterpolatorElement>> {
        Ok(match *self {
            Self::Constant => Box::new(ConstantInterpolator::default()),
            Self::Ema(params) => Box::new(FirstOrderEmaInterpolator::new(params)?),
            Self::Trapezoid {
                max_vel,
                accel,
                decel,
            } => Box::new(TrapezoidInterpolator::new(
                Self::profile(max_vel, accel, decel)?,
                clock,
            )),
        })
    }
}

// ─── Control system ─────────────────────────────────────────────────

/// Complete control system description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSystemConfig {
    pub feedback: FeedbackConfig,
    pub feedforward: FeedforwardConfig,
    pub filter: FilterConfig,
    pub interpolator: InterpolatorConfig,
}

impl ControlSystemConfig {
    /// Check every parameter that element construction would reject.
    ///
    /// # Errors
    ///
    /// `ConfigError::ValidationError` describing the first bad parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter
            .check()
            .and_then(|()| self.interpolator.check())
            .map_err(|err| {
                warn!(error = %err, "invalid control system configuration");
                ConfigError::from(err)
            })
    }

    /// Build the described control system on `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`ControlSystemConfig::validate`].
    pub fn build<C: Clock + Clone + 'static>(
        &self,
        clock: C,
    ) -> Result<ControlSystem, ConfigError> {
        self.validate()?;
        let feedback = self.feedback.element(&clock);
        let filter = self.filter.element()?;
        let interpolator = self.interpolator.element(clock)?;
        Ok(ControlSystem::new(
            feedback,
            self.feedforward.element(),
            filter,
            interpolator,
        ))
    }

    /// Channel names with at least one filter stage.
    pub fn filtered_channels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filter
            .channels()
            .into_iter()
            .filter(|(_, stages)| !stages.is_empty())
            .map(|(name, _)| name)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
