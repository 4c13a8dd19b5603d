mod common;

use common::{fixtures::*, mock_oracles, types::*};
use scope::{assert_fuzzy_price_eq, DecodeError, Price, Pubkey, RefreshStatus, ScopeError};

const EPSILON: Price = Price { value: 1, exp: 6 };

#[test]
fn test_refresh_every_oracle_type() {
    let mapping: Vec<OracleConf> = TestOracleType::ALL
        .iter()
        .zip(0_u16..)
        .map(|(price_type, token)| OracleConf::new(token, *price_type))
        .collect();
    let mut ctx = setup_scope("refresh_all", &mapping);
    ctx.advance_seconds(10);

    let price = Price {
        value: 1_250,
        exp: 3,
    };
    for conf in &mapping {
        mock_oracles::set_price(&mut ctx, conf, &price);
        let refresh = ctx.refresh(conf).unwrap();
        assert_eq!(refresh.token, conf.token);
        assert_eq!(refresh.price_type, Some(conf.price_type.to_oracle_type()));

        let stored = ctx.feed.get_dated_price(conf.idx()).unwrap();
        assert_eq!(refresh.status, RefreshStatus::Updated(stored));
        assert_fuzzy_price_eq!(stored.price, price, EPSILON, "Oracle type {:?}", conf.price_type);
        // dated with the engine clock, whatever the upstream says
        assert_eq!(stored.last_updated_slot, ctx.clock.slot);
        assert_eq!(stored.unix_timestamp, ctx.clock.unix_timestamp_u64());
        assert_eq!(stored.index, conf.token);
    }
}

#[test]
fn test_pyth_not_trading_keeps_previous_price() {
    let pyth = OracleConf::new(0, TestOracleType::Pyth);
    let mut ctx = setup_scope_refreshed("pyth_halted", &[pyth.clone()]);
    let before = ctx.feed.get_dated_price(0).unwrap();
    assert_eq!(before.price, initial_price());

    ctx.advance_seconds(5);
    let halted = mock_oracles::pyth::get_account_data_with_status(
        &Price { value: 5, exp: 0 },
        &ctx.clock,
        2,
    );
    ctx.set_account(&pyth.pubkey, halted);

    assert_eq!(
        ctx.refresh(&pyth),
        Err(ScopeError::Decode(DecodeError::StaleOrInvalid))
    );
    assert_eq!(ctx.feed.get_dated_price(0).unwrap(), before);
}

#[test]
fn test_ctoken_reserve_with_twice_the_supply() {
    let ctoken = OracleConf::new(7, TestOracleType::CToken);
    let mut ctx = setup_scope("ctoken", &[ctoken.clone()]);

    let reserve = mock_oracles::ctokens::get_account_data(100, 0, 50, &ctx.clock);
    ctx.set_account(&ctoken.pubkey, reserve);
    ctx.refresh(&ctoken).unwrap();

    let stored = ctx.feed.get_dated_price(7).unwrap();
    assert_eq!(stored.price, Price { value: 2, exp: 0 });
    assert_eq!(stored.price.exp, 15);
}

#[test]
fn test_ctoken_empty_supply() {
    let ctoken = OracleConf::new(7, TestOracleType::CToken);
    let mut ctx = setup_scope("ctoken_empty", &[ctoken.clone()]);

    let reserve = mock_oracles::ctokens::get_account_data(100, 0, 0, &ctx.clock);
    ctx.set_account(&ctoken.pubkey, reserve);
    assert_eq!(
        ctx.refresh(&ctoken),
        Err(ScopeError::Decode(DecodeError::DivideByZero))
    );
    assert_eq!(ctx.feed.get_dated_price(7).unwrap().price.value, 0);
}

#[test]
fn test_wrong_account_is_rejected() {
    let pyth = OracleConf::new(3, TestOracleType::Pyth);
    let mut ctx = setup_scope_refreshed("wrong_account", &[pyth.clone()]);
    let before = ctx.feed.get_dated_price(3).unwrap();

    // Valid pyth data behind another key
    let other = Pubkey::new_unique();
    let data = mock_oracles::pyth::get_account_data_for_price(&Price { value: 9, exp: 0 }, &ctx.clock);
    ctx.set_account(&other, data);
    ctx.advance_seconds(1);

    assert_eq!(
        ctx.refresh_with(3, &other, &[]),
        Err(ScopeError::UnexpectedAccount)
    );
    assert_eq!(ctx.feed.get_dated_price(3).unwrap(), before);
}

#[test]
fn test_unmapped_slot_is_skipped() {
    let mut ctx = setup_scope("unmapped", &[]);
    let key = Pubkey::new_unique();
    let data = mock_oracles::pyth::get_account_data_for_price(&initial_price(), &ctx.clock);
    ctx.set_account(&key, data);

    let refresh = ctx.refresh_with(12, &key, &[]).unwrap();
    assert_eq!(refresh.status, RefreshStatus::Skipped);
    assert_eq!(refresh.price_type, None);
    assert_eq!(ctx.feed.get_dated_price(12).unwrap(), Default::default());
}

#[test]
fn test_token_out_of_range() {
    let mut ctx = setup_scope("out_of_range", &[]);
    let key = Pubkey::new_unique();
    assert_eq!(
        ctx.refresh_with(scope::MAX_ENTRIES_U16, &key, &[]),
        Err(ScopeError::SlotOutOfRange)
    );
}

#[test]
fn test_yitoken_needs_its_mint() {
    let yi = OracleConf::new(2, TestOracleType::YiToken);
    let mut ctx = setup_scope("yi_mint", &[yi.clone()]);

    assert_eq!(
        ctx.refresh_with(2, &yi.pubkey, &[]),
        Err(ScopeError::AccountsAndTokenMismatch)
    );

    // A mint whose authority does not own the vault
    let mint = mock_oracles::yitoken::mint_data(&Pubkey::new_unique(), 1_000);
    ctx.set_account(&yi.extra_pubkeys[0], mint);
    assert_eq!(ctx.refresh(&yi), Err(ScopeError::UnexpectedAccount));
}

#[test]
fn test_yitoken_mint_is_pinned() {
    let yi = OracleConf::new(2, TestOracleType::YiToken);
    let mut ctx = setup_scope_refreshed("yi_forged_mint", &[yi.clone()]);
    let before = ctx.feed.get_dated_price(2).unwrap();
    ctx.advance_seconds(1);

    // Any mint can name the vault owner as its authority
    let forged_mint = Pubkey::new_unique();
    let vault_owner = Pubkey::try_from(&ctx.account_data(&yi.pubkey)[32..64]).unwrap();
    ctx.set_account(
        &forged_mint,
        mock_oracles::yitoken::mint_data(&vault_owner, 1),
    );
    assert_eq!(
        ctx.refresh_with(2, &yi.pubkey, &[forged_mint]),
        Err(ScopeError::UnexpectedAccount)
    );
    assert_eq!(ctx.feed.get_dated_price(2).unwrap(), before);

    ctx.refresh(&yi).unwrap();
    assert_eq!(ctx.feed.get_dated_price(2).unwrap().price, initial_price());
}

#[test]
fn test_reference_price_too_far() {
    let reference = OracleConf::new(0, TestOracleType::Pyth);
    let checked = OracleConf::new(1, TestOracleType::SwitchboardV2).with_ref_price(0);
    let mut ctx = setup_scope_refreshed("ref_price", &[reference, checked.clone()]);

    ctx.advance_seconds(1);
    mock_oracles::set_price(&mut ctx, &checked, &Price { value: 1_040, exp: 3 });
    ctx.refresh(&checked).unwrap();

    mock_oracles::set_price(&mut ctx, &checked, &Price { value: 1_200, exp: 3 });
    assert_eq!(ctx.refresh(&checked), Err(ScopeError::RefPriceMismatch));
    assert_eq!(
        ctx.feed.get_dated_price(1).unwrap().price,
        Price { value: 1_040, exp: 3 }
    );
}

#[test]
fn test_stake_pool_of_previous_epoch() {
    let stake = OracleConf::new(4, TestOracleType::SplStake);
    let mut ctx = setup_scope("spl_stake", &[stake.clone()]);
    let pool = mock_oracles::spl_stake::get_account_data(1_100, 1_000, ctx.clock.epoch - 1);
    ctx.set_account(&stake.pubkey, pool);

    // The new epoch started less than one hour ago
    ctx.refresh(&stake).unwrap();

    ctx.advance_seconds(2 * 60 * 60);
    let result = ctx.refresh(&stake);
    if cfg!(feature = "skip_price_validation") {
        assert!(result.is_ok());
    } else {
        assert_eq!(result, Err(ScopeError::Decode(DecodeError::StaleOrInvalid)));
    }
}
