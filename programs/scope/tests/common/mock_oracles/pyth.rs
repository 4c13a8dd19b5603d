use bytemuck::Zeroable;
use scope::{
    oracles::pyth::{
        SolanaPriceAccount, ACCOUNT_TYPE_PRICE, MAGIC, PRICE_STATUS_TRADING, PRICE_TYPE_PRICE,
        VERSION_2,
    },
    Clock, Price,
};

/// Size of a real price account, publisher components included
const PRICE_ACCOUNT_SIZE: usize = 3312;

pub fn get_account_data_for_price(price: &Price, clock: &Clock) -> Vec<u8> {
    get_account_data_with_status(price, clock, PRICE_STATUS_TRADING)
}

pub fn get_account_data_with_status(price: &Price, clock: &Clock, status: u32) -> Vec<u8> {
    let int_price = i64::try_from(price.value).unwrap();
    let expo = -i32::try_from(price.exp).unwrap();
    let mut account = SolanaPriceAccount::zeroed();
    account.magic = MAGIC;
    account.ver = VERSION_2;
    account.atype = ACCOUNT_TYPE_PRICE;
    account.ptype = PRICE_TYPE_PRICE;
    account.expo = expo;
    account.num_qt = 3;
    account.valid_slot = clock.slot;
    account.last_slot = clock.slot;
    account.timestamp = clock.unix_timestamp;
    account.ema_price.val = int_price;
    account.ema_price.numer = int_price;
    account.ema_price.denom = 1;
    account.ema_conf.denom = 1;
    account.agg.price = int_price;
    account.agg.status = status;
    account.agg.pub_slot = clock.slot;

    let mut data = bytemuck::bytes_of(&account).to_vec();
    data.resize(PRICE_ACCOUNT_SIZE, 0);
    data
}
