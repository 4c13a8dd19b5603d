use bytemuck::Zeroable;
use scope::{
    oracles::{
        switchboard_v1::{AggregatorState, TYPE_AGGREGATOR},
        switchboard_v2::{AggregatorAccountData, AggregatorRound, SwitchboardDecimal},
    },
    Clock, Price,
};

pub fn get_v1_account_data_for_price(price: &Price, clock: &Clock) -> Vec<u8> {
    let mantissa = i64::try_from(price.value).unwrap();
    let mut aggregator = AggregatorState::zeroed();
    aggregator.account_type[0] = TYPE_AGGREGATOR;
    aggregator.min_confirmations = 3;
    aggregator.num_success = 3;
    aggregator.round_open_slot = clock.slot;
    aggregator.round_open_timestamp = clock.unix_timestamp;
    aggregator.result_mantissa = mantissa;
    aggregator.result_scale = price.exp.try_into().unwrap();
    aggregator.min_response_mantissa = mantissa;
    aggregator.max_response_mantissa = mantissa;
    bytemuck::bytes_of(&aggregator).to_vec()
}

pub fn get_v2_account_data_for_price(price: &Price, clock: &Clock) -> Vec<u8> {
    let mut round = AggregatorRound::zeroed();
    round.num_success = 1;
    round.round_open_slot = clock.slot;
    round.round_open_timestamp = clock.unix_timestamp;
    round.result = SwitchboardDecimal::new(price.value.into(), price.exp.try_into().unwrap());

    let mut aggregator = AggregatorAccountData::zeroed();
    aggregator.min_oracle_results = 1;
    aggregator.latest_confirmed_round = round;

    let mut data = AggregatorAccountData::discriminator().to_vec();
    data.extend_from_slice(bytemuck::bytes_of(&aggregator));
    data
}
