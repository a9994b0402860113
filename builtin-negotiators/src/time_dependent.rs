use serde::{Deserialize, Serialize};
use std::time::Duration;

use boa_domain::{BidDetails, NegotiationSession};
use boa_negotiator_component::params::{or_default, parse_config, ParameterSpec};
use boa_negotiator_component::pause::MAX_PAUSE;
use boa_negotiator_component::static_lib::{Component, ComponentFactory};
use boa_negotiator_component::{
    OfferingContext, OfferingStrategy, Pause, Regime, SelectionError, ThreadSleep,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub min_utility: f64,
    /// Concession exponent. Values below 1 concede late, above 1 early.
    pub e: f64,
    pub offensive_utility: f64,
    pub scare_threshold: f64,
    pub concede_threshold: f64,
    #[serde(with = "humantime_serde")]
    pub scare_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_utility: 0.5,
            e: 1.0,
            offensive_utility: 0.9,
            scare_threshold: 0.9,
            concede_threshold: 0.9,
            scare_delay: Duration::from_millis(100),
        }
    }
}

/// Time dependent concession with two regimes. Against cooperative opponent
/// concedes along `p(t)` for the whole negotiation. Against offensive one
/// holds `offensive_utility` until `concede_threshold` and hesitates before
/// each offer after `scare_threshold`.
pub struct RegimeConcession {
    min_utility: f64,
    e: f64,
    offensive_utility: f64,
    scare_threshold: f64,
    concede_threshold: f64,
    scare_delay: Duration,
    pause: Box<dyn Pause>,
}

impl RegimeConcession {
    pub fn with_config(config: Config) -> RegimeConcession {
        let defaults = Config::default();
        let unit = |value: f64| (0.0..=1.0).contains(&value);

        let scare_delay = if config.scare_delay > MAX_PAUSE {
            log::warn!(
                "Scare delay {} exceeds limit. Using {}.",
                humantime::format_duration(config.scare_delay),
                humantime::format_duration(MAX_PAUSE)
            );
            MAX_PAUSE
        } else {
            config.scare_delay
        };

        let min_utility =
            or_default("minUtility", config.min_utility, defaults.min_utility, unit);

        RegimeConcession {
            min_utility,
            e: or_default("e", config.e, defaults.e, |e| e > 0.0),
            // Offensive target can't be lower than the concession curve floor.
            offensive_utility: or_default(
                "offensiveUtility",
                config.offensive_utility,
                defaults.offensive_utility.max(min_utility),
                |utility| utility >= min_utility && utility <= 1.0,
            ),
            scare_threshold: or_default(
                "scareThreshold",
                config.scare_threshold,
                defaults.scare_threshold,
                |_| true,
            ),
            concede_threshold: or_default(
                "concedeThreshold",
                config.concede_threshold,
                defaults.concede_threshold,
                |_| true,
            ),
            scare_delay,
            pause: Box::new(ThreadSleep),
        }
    }

    pub fn with_pause(mut self, pause: Box<dyn Pause>) -> RegimeConcession {
        self.pause = pause;
        self
    }

    /// Concession curve: 1 at the beginning, `min_utility` at the deadline.
    pub fn p(&self, time: f64) -> f64 {
        let time = time.clamp(0.0, 1.0);
        self.min_utility + (1.0 - self.min_utility) * (1.0 - time.powf(1.0 / self.e))
    }
}

impl OfferingStrategy for RegimeConcession {
    fn determine_next_bid(&mut self, ctx: OfferingContext<'_>) -> anyhow::Result<BidDetails> {
        let time = ctx.session.time();
        let regime = Regime::of(ctx.opponent_model);

        if regime == Regime::Offensive && time >= self.scare_threshold {
            log::debug!(
                "Offensive regime at time {:.3}. Pausing for {}.",
                time,
                humantime::format_duration(self.scare_delay)
            );
            self.pause.pause(self.scare_delay);
        }

        let target = self.target_utility(time, regime);
        let space = ctx.session.outcome_space();
        let details = match ctx.opponent_model {
            None => space
                .bid_near_utility(target)
                .ok_or(SelectionError::EmptyOutcomeSpace)?,
            Some(model) => ctx.om_strategy.select_near(space, model, target)?,
        };

        log::debug!(
            "[{}] Target utility: {:.3}, offering {} with utility {:.3}.",
            regime,
            target,
            details.bid,
            details.my_undiscounted_util
        );
        Ok(details.at_time(time))
    }

    fn target_utility(&self, time: f64, regime: Regime) -> f64 {
        match regime {
            Regime::Cooperative => self.p(time),
            Regime::Offensive if time >= self.concede_threshold => self.p(time),
            Regime::Offensive => self.offensive_utility,
        }
    }
}

impl ComponentFactory for RegimeConcession {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        _session: &NegotiationSession,
    ) -> anyhow::Result<Self> {
        let config: Config = parse_config(config)?;
        Ok(RegimeConcession::with_config(config))
    }

    fn parameter_spec() -> Vec<ParameterSpec> {
        let defaults = Config::default();
        vec![
            ParameterSpec::new("minUtility", defaults.min_utility, "Minimum target utility"),
            ParameterSpec::new("e", defaults.e, "Concession rate"),
            ParameterSpec::new(
                "offensiveUtility",
                defaults.offensive_utility,
                "Target utility against offensive opponent before concedeThreshold",
            ),
            ParameterSpec::new(
                "scareThreshold",
                defaults.scare_threshold,
                "Time after which offers to offensive opponent are delayed",
            ),
            ParameterSpec::new(
                "concedeThreshold",
                defaults.concede_threshold,
                "Time after which we concede to offensive opponent",
            ),
            ParameterSpec::new(
                "scareDelay",
                defaults.scare_delay.as_secs_f64(),
                &format!(
                    "Delay in seconds before offers to offensive opponent (at most {})",
                    humantime::format_duration(MAX_PAUSE)
                ),
            ),
        ]
    }

    fn into_component(self) -> Component {
        Component::OfferingStrategy(Box::new(self))
    }
}
