use scope::{AccountInfo, Price, Pubkey, ScopeFeed};

use super::{
    init_logs,
    mock_oracles::set_price,
    types::{OracleConf, TestContext},
};

/// Max age given to every configured token
pub const DEFAULT_MAX_AGE: u64 = 30;

/// Price written in every upstream account by [`setup_scope`]
pub fn initial_price() -> Price {
    Price {
        value: 1_000,
        exp: 3,
    }
}

/// Create a feed, its upstream accounts and the mappings of `mapping`.
///
/// The mappings are set with the checked admin path so every mock account goes through the
/// layout validation of its oracle type. Prices are not refreshed.
pub fn setup_scope(feed_name: &str, mapping: &[OracleConf]) -> TestContext {
    init_logs();
    let admin = Pubkey::new_unique();
    let feed = ScopeFeed::new(admin, feed_name).unwrap();
    let mut ctx = TestContext::new(admin, feed);
    let cap = ctx.feed.authorize(&admin).unwrap();

    for conf in mapping {
        set_price(&mut ctx, conf, &initial_price());
        let data = ctx.account_data(&conf.pubkey).to_vec();
        let price_info = AccountInfo::new(&conf.pubkey, &data);
        ctx.feed
            .set_mapping(
                &cap,
                conf.idx(),
                conf.price_type.to_oracle_type(),
                Some(&price_info),
                conf.options,
            )
            .unwrap();
        ctx.feed
            .set_metadata(
                &cap,
                conf.idx(),
                DEFAULT_MAX_AGE,
                &format!("{:?} {}", conf.price_type, conf.token),
            )
            .unwrap();
    }
    ctx
}

/// Same as [`setup_scope`] then refresh every token once.
pub fn setup_scope_refreshed(feed_name: &str, mapping: &[OracleConf]) -> TestContext {
    let mut ctx = setup_scope(feed_name, mapping);
    let confs: Vec<&OracleConf> = mapping.iter().collect();
    if !confs.is_empty() {
        ctx.refresh_confs(&confs).unwrap().into_result().unwrap();
    }
    ctx
}
