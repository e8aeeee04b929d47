//! Thermal and billing engine
//!
//! Runs one room forward one second at a time: temperature movement,
//! target snapping, the serve→pause and pause→wait transitions, and the
//! charge for serviced temperature change. The engine mutates only the
//! room it is handed; queue and journal bookkeeping happen in the
//! scheduler by comparing room states before and after the pass.

use crate::room::{FanSpeed, Mode, PowerState, Room};

/// Tolerance for snapping onto the target or initial temperature, °C
pub const TEMP_TOLERANCE: f64 = 0.005;
/// Drift rate while paused or off, °C per minute
pub const DRIFT_RATE_PER_MIN: f64 = 0.5;
/// A paused room re-requests service after drifting this far, °C
pub const RESUME_DELTA: f64 = 1.0;
/// Slack on the resume threshold against float error
pub const RESUME_TOLERANCE: f64 = 0.001;
/// Fee in monetary units per degree of serviced change
pub const FEE_RATE_PER_DEGREE: f64 = 1.0;

/// Round to `digits` decimals, half up
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Per-second temperature and billing model
#[derive(Debug, Default)]
pub struct ThermalEngine;

impl ThermalEngine {
    pub fn new() -> Self {
        Self
    }

    /// Serviced temperature change per second for a fan speed, °C
    pub fn serving_rate_per_second(speed: FanSpeed) -> f64 {
        let per_minute = match speed {
            FanSpeed::High => 1.0,
            FanSpeed::Medium => 0.5,
            FanSpeed::Low => 1.0 / 3.0,
        };
        per_minute / 60.0
    }

    /// Fee rate applied to serviced change; uniform across speeds
    ///
    /// The speed↔cost relation is carried entirely by the temperature
    /// rate, so the rate per degree does not vary.
    pub fn fee_rate(&self, _speed: FanSpeed) -> f64 {
        FEE_RATE_PER_DEGREE
    }

    /// Advance a room by `seconds`, returning the billable cost
    ///
    /// The returned cost is meaningful only when the room was serving;
    /// the scheduler credits it only if the room is still serving after
    /// the pass.
    pub fn advance(&self, room: &mut Room, seconds: u32) -> f64 {
        // Normalize up front so accumulated float error never compounds.
        room.current_temp = round_to(room.current_temp, 3);
        match room.state {
            PowerState::Serving => self.advance_serving(room, seconds),
            PowerState::Paused => {
                self.advance_paused(room, seconds);
                0.0
            }
            PowerState::Waiting => 0.0, // temperature frozen while queued
            PowerState::Off => {
                self.advance_off(room, seconds);
                0.0
            }
        }
    }

    fn advance_serving(&self, room: &mut Room, seconds: u32) -> f64 {
        let rate = Self::serving_rate_per_second(room.fan_speed);
        let mut temp_change = 0.0;

        for _ in 0..seconds {
            let gap = match room.mode {
                Mode::Cool => room.current_temp - room.target_temp,
                Mode::Heat => room.target_temp - room.current_temp,
            };
            if gap.abs() <= TEMP_TOLERANCE {
                room.current_temp = round_to(room.target_temp, 3);
                room.state = PowerState::Paused;
                break;
            }
            if gap < 0.0 {
                // Already past the target (cooling below it, or heating
                // above): stop billing and let the room drift back.
                room.state = PowerState::Paused;
                self.drift_toward_target(room, seconds);
                return 0.0;
            }

            let step = match room.mode {
                Mode::Cool => -rate,
                Mode::Heat => rate,
            };
            room.current_temp = round_to(room.current_temp + step, 3);
            temp_change += rate;

            let remaining = match room.mode {
                Mode::Cool => room.current_temp - room.target_temp,
                Mode::Heat => room.target_temp - room.current_temp,
            };
            if remaining.abs() <= TEMP_TOLERANCE || remaining <= 0.0 {
                room.current_temp = round_to(room.target_temp, 3);
                room.state = PowerState::Paused;
                break;
            }
        }

        // Tail alignment against residual float error.
        if (room.current_temp - room.target_temp).abs() < TEMP_TOLERANCE {
            room.current_temp = round_to(room.target_temp, 3);
        }

        round_to(temp_change * FEE_RATE_PER_DEGREE, 3)
    }

    /// Unbilled drift back toward the target, capped at the target
    fn drift_toward_target(&self, room: &mut Room, seconds: u32) {
        let rate = DRIFT_RATE_PER_MIN / 60.0;
        for _ in 0..seconds {
            let step = match room.mode {
                Mode::Cool => rate,
                Mode::Heat => -rate,
            };
            room.current_temp = round_to(room.current_temp + step, 3);
            let remaining = match room.mode {
                Mode::Cool => room.target_temp - room.current_temp,
                Mode::Heat => room.current_temp - room.target_temp,
            };
            if remaining.abs() <= TEMP_TOLERANCE || remaining <= 0.0 {
                room.current_temp = round_to(room.target_temp, 3);
                break;
            }
        }
    }

    fn advance_paused(&self, room: &mut Room, seconds: u32) {
        let rate = DRIFT_RATE_PER_MIN / 60.0;
        for _ in 0..seconds {
            match room.mode {
                Mode::Cool => {
                    room.current_temp = round_to(room.current_temp + rate, 3);
                    let threshold = room.target_temp + RESUME_DELTA - RESUME_TOLERANCE;
                    if room.current_temp >= threshold {
                        room.state = PowerState::Waiting;
                        return;
                    }
                }
                Mode::Heat => {
                    room.current_temp = round_to(room.current_temp - rate, 3);
                    let threshold = room.target_temp - RESUME_DELTA + RESUME_TOLERANCE;
                    if room.current_temp <= threshold {
                        room.state = PowerState::Waiting;
                        return;
                    }
                }
            }
        }
    }

    fn advance_off(&self, room: &mut Room, seconds: u32) {
        let rate = DRIFT_RATE_PER_MIN / 60.0;
        for _ in 0..seconds {
            let gap = room.current_temp - room.initial_temp;
            if gap.abs() <= TEMP_TOLERANCE {
                room.current_temp = round_to(room.initial_temp, 3);
                break;
            }
            let step = if gap < 0.0 { rate } else { -rate };
            room.current_temp = round_to(room.current_temp + step, 3);
            let remaining = room.current_temp - room.initial_temp;
            if remaining.abs() <= TEMP_TOLERANCE || remaining.signum() != gap.signum() {
                room.current_temp = round_to(room.initial_temp, 3);
                break;
            }
        }
    }
}
