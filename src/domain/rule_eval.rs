//! Rule evaluation against an indicator snapshot.
//!
//! # Evaluation Semantics
//!
//! - A rule whose inputs include an undefined indicator does not fire.
//! - Entry: only the rule matching the current regime is consulted.
//! - Exit: rules are checked in [`ExitRule`] order; the first to fire wins.

use crate::domain::indicator::snapshot::IndicatorSnapshot;
use crate::domain::position::Position;
use crate::domain::regime::Regime;
use crate::domain::rule::*;

pub fn evaluate_entry(snap: &IndicatorSnapshot, regime: Regime) -> Option<EntryRule> {
    let rule = EntryRule::for_regime(regime);
    let fires = match rule {
        EntryRule::Trend => trend_entry(snap),
        EntryRule::Range => range_entry(snap),
        EntryRule::Squeeze => squeeze_entry(snap),
    };
    fires.then_some(rule)
}

pub fn evaluate_exit(
    position: &Position,
    snap: &IndicatorSnapshot,
    regime: Regime,
    trail_pct: f64,
) -> Option<ExitRule> {
    if snap.close <= position.trailing_stop(trail_pct) {
        Some(ExitRule::TrailingStop)
    } else if volatility_exit(snap) {
        Some(ExitRule::Volatility)
    } else if momentum_exit(snap) {
        Some(ExitRule::Momentum)
    } else if regime != position.regime {
        Some(ExitRule::RegimeShift)
    } else {
        None
    }
}

pub fn trend_entry(snap: &IndicatorSnapshot) -> bool {
    let (Some(ema), Some(rsi), Some(adx), Some(plus_di), Some(minus_di), Some(volume_ema)) = (
        snap.ema,
        snap.rsi,
        snap.adx,
        snap.plus_di,
        snap.minus_di,
        snap.volume_ema,
    ) else {
        return false;
    };

    snap.close > ema * TREND_EMA_PREMIUM
        && rsi > TREND_MIN_RSI
        && adx > TREND_MIN_ADX
        && plus_di > minus_di
        && snap.volume > volume_ema
}

pub fn range_entry(snap: &IndicatorSnapshot) -> bool {
    let (Some(adx), Some(rsi), Some(upper), Some(lower)) =
        (snap.adx, snap.rsi, snap.upper_band, snap.lower_band)
    else {
        return false;
    };

    let oversold = rsi < RANGE_OVERSOLD_RSI && snap.close < lower;
    let overbought = rsi > RANGE_OVERBOUGHT_RSI && snap.close > upper;
    adx < RANGE_MAX_ADX && (oversold || overbought)
}

pub fn squeeze_entry(snap: &IndicatorSnapshot) -> bool {
    let (Some(atr), Some(atr_baseline), Some(volume_baseline), Some(upper), Some(lower)) = (
        snap.atr,
        snap.atr_baseline,
        snap.volume_baseline,
        snap.upper_band,
        snap.lower_band,
    ) else {
        return false;
    };

    let compressed = atr < atr_baseline * SQUEEZE_ATR_RATIO;
    let volume_spike = snap.volume > volume_baseline * SQUEEZE_VOLUME_RATIO;
    let breakout = snap.close > upper || snap.close < lower;
    compressed && volume_spike && breakout
}

pub fn volatility_exit(snap: &IndicatorSnapshot) -> bool {
    match (snap.ema, snap.atr) {
        (Some(ema), Some(atr)) => snap.close < ema - atr * VOLATILITY_EXIT_ATR_MULT,
        _ => false,
    }
}

pub fn momentum_exit(snap: &IndicatorSnapshot) -> bool {
    match (snap.rsi, snap.ema) {
        (Some(rsi), Some(ema)) => rsi < MOMENTUM_EXIT_RSI && snap.close < ema,
        _ => false,
    }
}
