use bytemuck::{Pod, Zeroable};
use solana_pubkey::Pubkey;

use super::DatedPrice;
use crate::{
    utils::consts::*, Price, ScopeError, ScopeResult, MAX_ENTRIES, MIN_TWAP_WINDOW, TWAP_NUM_OBS,
};

/// Outcome of pushing a sample in a [`TwapBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwapUpdate {
    /// The sample was appended (possibly evicting the oldest one)
    Added,
    /// A sample with the same timestamp is already the latest one, nothing changed
    Duplicate,
    /// The buffer was empty or its window changed, the sample is now the only one
    Reset,
}

static_assertions::const_assert_eq!(TWAP_BUFFER_SIZE, std::mem::size_of::<TwapBuffer>());
/// Ring buffer of the last `window` samples of a price with a running time-weighted aggregate.
///
/// Every observation is weighted by the time elapsed until the next one, so the aggregate
/// only covers the closed intervals between stored samples. Pushing a sample only touches
/// the newest and the evicted observation.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct TwapBuffer {
    /// Sum of `value * duration` over the intervals of the window
    pub weighted_sum: u128,
    pub observations: [Price; TWAP_NUM_OBS],
    pub unix_timestamps: [u64; TWAP_NUM_OBS],
    pub slots: [u64; TWAP_NUM_OBS],
    /// Index of the newest observation
    pub curr_index: u64,
    pub num_obs: u64,
    pub window: u64,
    /// Exponent all observations are rescaled to
    pub exp: u64,
    /// Sum of the durations of the intervals of the window
    pub total_weight: u64,
    pub window_start: u64,
}

impl Default for TwapBuffer {
    fn default() -> Self {
        Zeroable::zeroed()
    }
}

impl TwapBuffer {
    pub fn is_empty(&self) -> bool {
        self.num_obs == 0
    }

    pub fn len(&self) -> usize {
        self.num_obs as usize
    }

    fn idx(&self, i: u64) -> usize {
        // window is at least MIN_TWAP_WINDOW once a sample has been stored
        (i % self.window.max(1)) as usize
    }

    /// Latest stored observation.
    pub fn latest(&self) -> Option<DatedPrice> {
        if self.is_empty() {
            return None;
        }
        let i = self.idx(self.curr_index);
        Some(DatedPrice::new(
            self.observations[i],
            self.slots[i],
            self.unix_timestamps[i],
        ))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn reset_with(&mut self, price: Price, unix_timestamp: u64, slot: u64, window: u64) {
        self.reset();
        self.window = window;
        self.exp = price.exp;
        self.observations[0] = price;
        self.unix_timestamps[0] = unix_timestamp;
        self.slots[0] = slot;
        self.num_obs = 1;
        self.window_start = unix_timestamp;
    }

    /// Push a new sample.
    ///
    /// Samples must come with strictly increasing timestamps: a sample at the timestamp of the
    /// latest one is a duplicate and is dropped, an older one is rejected with
    /// [`ScopeError::BadTimestamp`].
    pub fn update(
        &mut self,
        price: Price,
        unix_timestamp: u64,
        slot: u64,
        window: u8,
    ) -> ScopeResult<TwapUpdate> {
        let window = u64::from(window);
        if !(MIN_TWAP_WINDOW as u64..=TWAP_NUM_OBS as u64).contains(&window) {
            return Err(ScopeError::OutOfRangeIntegralConversion);
        }
        if self.is_empty() || self.window != window {
            self.reset_with(price, unix_timestamp, slot, window);
            return Ok(TwapUpdate::Reset);
        }

        let curr = self.idx(self.curr_index);
        let last_ts = self.unix_timestamps[curr];
        if unix_timestamp == last_ts {
            return Ok(TwapUpdate::Duplicate);
        }
        if unix_timestamp < last_ts {
            return Err(ScopeError::BadTimestamp);
        }
        let sample = price.rescale(self.exp)?;

        let duration = unix_timestamp - last_ts;
        let mut weighted_sum = u128::from(self.observations[curr].value)
            .checked_mul(u128::from(duration))
            .and_then(|w| self.weighted_sum.checked_add(w))
            .ok_or(ScopeError::MathOverflow)?;
        let mut total_weight = self
            .total_weight
            .checked_add(duration)
            .ok_or(ScopeError::MathOverflow)?;
        let mut window_start = self.window_start;
        let mut num_obs = self.num_obs;

        let next = self.idx(self.curr_index + 1);
        if num_obs == self.window {
            // `next` holds the oldest observation which is about to be overwritten
            let after_oldest = self.idx(self.curr_index + 2);
            let evicted_duration = self.unix_timestamps[after_oldest] - self.unix_timestamps[next];
            weighted_sum -=
                u128::from(self.observations[next].value) * u128::from(evicted_duration);
            total_weight -= evicted_duration;
            window_start = self.unix_timestamps[after_oldest];
        } else {
            num_obs += 1;
        }

        self.observations[next] = sample;
        self.unix_timestamps[next] = unix_timestamp;
        self.slots[next] = slot;
        self.curr_index = next as u64;
        self.num_obs = num_obs;
        self.weighted_sum = weighted_sum;
        self.total_weight = total_weight;
        self.window_start = window_start;
        Ok(TwapUpdate::Added)
    }

    /// Time-weighted average of the stored samples.
    ///
    /// With a single sample (or samples spanning no time) the latest price is returned.
    pub fn twap(&self) -> ScopeResult<DatedPrice> {
        let mut latest = self
            .latest()
            .ok_or(ScopeError::TwapNotEnoughSamplesInPeriod)?;
        if self.total_weight > 0 {
            let value = self.weighted_sum / u128::from(self.total_weight);
            latest.price = Price {
                value: u64::try_from(value)?,
                exp: self.exp,
            };
        }
        Ok(latest)
    }

    /// Observations from the oldest to the newest.
    pub fn iter_observations(&self) -> impl Iterator<Item = (Price, u64)> + '_ {
        let oldest = if self.is_empty() {
            0
        } else {
            self.curr_index + self.window - (self.num_obs - 1)
        };
        (0..self.num_obs).map(move |k| {
            let i = self.idx(oldest + k);
            (self.observations[i], self.unix_timestamps[i])
        })
    }

    /// Rebuild `(weighted_sum, total_weight)` by scanning the whole window.
    pub fn recompute_aggregate(&self) -> (u128, u64) {
        let observations: Vec<(Price, u64)> = self.iter_observations().collect();
        observations
            .windows(2)
            .fold((0_u128, 0_u64), |(sum, weight), pair| {
                let (price, ts) = pair[0];
                let duration = pair[1].1 - ts;
                (
                    sum + u128::from(price.value) * u128::from(duration),
                    weight + duration,
                )
            })
    }
}

static_assertions::const_assert_eq!(ORACLE_TWAPS_SIZE, std::mem::size_of::<OracleTwaps>());
static_assertions::const_assert_eq!(0, std::mem::size_of::<OracleTwaps>() % 8);
// Account to store TWAP buffers
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct OracleTwaps {
    pub oracle_prices: Pubkey,
    pub oracle_mappings: Pubkey,
    pub twaps: [TwapBuffer; MAX_ENTRIES],
}

impl OracleTwaps {
    pub fn get_twap(&self, entry_id: usize) -> ScopeResult<&TwapBuffer> {
        self.twaps.get(entry_id).ok_or(ScopeError::SlotOutOfRange)
    }

    pub fn get_twap_mut(&mut self, entry_id: usize) -> ScopeResult<&mut TwapBuffer> {
        self.twaps.get_mut(entry_id).ok_or(ScopeError::SlotOutOfRange)
    }

    pub fn reset_entry(&mut self, entry_id: usize) -> ScopeResult<()> {
        self.get_twap_mut(entry_id)?.reset();
        Ok(())
    }
}
