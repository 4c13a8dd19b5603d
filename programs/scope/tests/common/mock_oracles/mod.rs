use scope::{Price, Pubkey};

use super::types::{OracleConf, TestContext, TestOracleType};

pub mod ctokens;
pub mod ktokens;
pub mod msol_stake;
pub mod pyth;
pub mod spl_stake;
pub mod switchboard;
pub mod yitoken;

/// Write in `ctx` the upstream accounts of `conf` so that its next refresh reads `price`.
pub fn set_price(ctx: &mut TestContext, conf: &OracleConf, price: &Price) {
    let clock = ctx.clock;
    let PriceSourceAccounts {
        oracle_data,
        additional_accs,
    } = match conf.price_type {
        TestOracleType::Pyth | TestOracleType::PythEMA => {
            sp(pyth::get_account_data_for_price(price, &clock))
        }
        TestOracleType::SwitchboardV1 => {
            sp(switchboard::get_v1_account_data_for_price(price, &clock))
        }
        TestOracleType::SwitchboardV2 => {
            sp(switchboard::get_v2_account_data_for_price(price, &clock))
        }
        TestOracleType::CToken => sp(ctokens::get_account_data_for_price(price, &clock)),
        TestOracleType::SplStake => sp(spl_stake::get_account_data_for_price(price, &clock)),
        TestOracleType::MsolStake => sp(msol_stake::get_account_data_for_price(price)),
        TestOracleType::KToken => sp(ktokens::get_account_data_for_price(price)),
        TestOracleType::YiToken => {
            let mint = conf.extra_pubkeys[0];
            let (token_account, mint_data) = yitoken::get_accounts_data_for_price(price);
            PriceSourceAccounts {
                oracle_data: token_account,
                additional_accs: vec![(mint, mint_data)],
            }
        }
    };
    additional_accs
        .into_iter()
        .for_each(|(address, data)| ctx.set_account(&address, data));
    ctx.set_account(&conf.pubkey, oracle_data)
}

struct PriceSourceAccounts {
    oracle_data: Vec<u8>,
    additional_accs: Vec<(Pubkey, Vec<u8>)>,
}

/// Helper to create a simple oracle account
fn sp(data: Vec<u8>) -> PriceSourceAccounts {
    PriceSourceAccounts {
        oracle_data: data,
        additional_accs: vec![],
    }
}

/// Mantissa and denominator of `price` as a ratio of integers.
pub(crate) fn as_ratio(price: &Price) -> (u64, u64) {
    (price.value, 10_u64.pow(price.exp.try_into().unwrap()))
}
