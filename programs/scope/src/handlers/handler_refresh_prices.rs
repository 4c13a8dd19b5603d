use tracing::{debug, warn};

use crate::{
    oracles::{get_price, twap::update_twap, OracleType},
    utils::{consts::MAX_PRICE_EXP, price_impl::check_ref_price_difference},
    AccountInfo, Clock, DatedPrice, MappingEntry, OracleMappings, OraclePrices, OracleTwaps,
    ScopeError, ScopeResult, TwapUpdate, MAX_ENTRIES, REFRESH_BATCH_SIZE,
};

/// Registries touched by a refresh.
///
/// Mappings are only read, prices and TWAPs are written.
pub struct RefreshAccounts<'ctx> {
    pub oracle_prices: &'ctx mut OraclePrices,
    pub oracle_mappings: &'ctx OracleMappings,
    pub oracle_twaps: &'ctx mut OracleTwaps,
    pub clock: &'ctx Clock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshStatus {
    /// The price was decoded, validated and written
    Updated(DatedPrice),
    /// No mapping for this slot, nothing was written
    Skipped,
    /// Decoding or validation failed, the previous price is kept
    Failed(ScopeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRefresh {
    pub token: u16,
    /// `None` when the slot is not mapped
    pub price_type: Option<OracleType>,
    pub status: RefreshStatus,
    /// Outcome of the TWAP update, `None` when the TWAP of the token is not enabled or
    /// nothing was written
    pub twap_update: Option<ScopeResult<TwapUpdate>>,
}

impl TokenRefresh {
    fn skipped(token: u16) -> Self {
        Self {
            token,
            price_type: None,
            status: RefreshStatus::Skipped,
            twap_update: None,
        }
    }

    fn failed(token: u16, price_type: OracleType, error: ScopeError) -> Self {
        Self {
            token,
            price_type: Some(price_type),
            status: RefreshStatus::Failed(error),
            twap_update: None,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self.status, RefreshStatus::Updated(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, RefreshStatus::Failed(_))
    }

    fn cu_estimate(&self) -> u64 {
        match (self.price_type, &self.status) {
            (Some(price_type), RefreshStatus::Updated(_) | RefreshStatus::Failed(_)) => {
                price_type.get_update_cu_budget().into()
            }
            _ => 0,
        }
    }
}

/// Per slot outcome of a batch or list refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub entries: Vec<TokenRefresh>,
    /// Sum of the compute budgets of the decoded slots
    pub cu_estimate: u64,
}

impl RefreshReport {
    fn push(&mut self, entry: TokenRefresh) {
        self.cu_estimate = self.cu_estimate.saturating_add(entry.cu_estimate());
        self.entries.push(entry);
    }

    pub fn updated(&self) -> impl Iterator<Item = &TokenRefresh> {
        self.entries.iter().filter(|e| e.is_updated())
    }

    pub fn failed_tokens(&self) -> Vec<u16> {
        self.entries
            .iter()
            .filter(|e| e.is_failed())
            .map(|e| e.token)
            .collect()
    }

    /// Fail with [`ScopeError::PartialRefresh`] if any slot failed.
    pub fn into_result(self) -> ScopeResult<Self> {
        let failed = self.failed_tokens();
        if failed.is_empty() {
            Ok(self)
        } else {
            Err(ScopeError::PartialRefresh(failed))
        }
    }
}

/// Accounts of one token of a refresh, checked against its mapping.
struct PlannedRefresh<'p, 'a> {
    token: u16,
    /// `None` when the slot is not mapped
    entry: Option<MappingEntry>,
    price_info: &'p AccountInfo<'a>,
    extra_accounts: &'p [AccountInfo<'a>],
}

/// Refresh a single token.
///
/// Unlike the batch and list variants, a decoding or validation failure is returned as an error.
pub fn refresh_one_price<'a>(
    ctx: &mut RefreshAccounts<'_>,
    token: u16,
    price_info: &AccountInfo<'a>,
    extra_accounts: &[AccountInfo<'a>],
) -> ScopeResult<TokenRefresh> {
    let mut extra_accounts = extra_accounts;
    let plan = plan_token(ctx.oracle_mappings, token, price_info, &mut extra_accounts)?;
    let refresh = refresh_token(ctx, plan)?;
    match refresh.status {
        RefreshStatus::Failed(e) => Err(e),
        _ => Ok(refresh),
    }
}

/// Refresh `REFRESH_BATCH_SIZE` consecutive tokens starting at `first_token`.
///
/// Accounts with the default key are padding and are ignored. Extra accounts needed by some
/// oracle types are taken in order from `extra_accounts`.
/// All accounts are checked before the first price is written: on error nothing changes.
pub fn refresh_batch_prices<'a>(
    ctx: &mut RefreshAccounts<'_>,
    first_token: u16,
    price_infos: &[AccountInfo<'a>; REFRESH_BATCH_SIZE],
    extra_accounts: &[AccountInfo<'a>],
) -> ScopeResult<RefreshReport> {
    let mut extra_accounts = extra_accounts;
    let mut plans = Vec::with_capacity(REFRESH_BATCH_SIZE);

    for (offset, price_info) in (0_u16..).zip(price_infos.iter()) {
        if price_info.is_placeholder() {
            continue;
        }
        let token = first_token
            .checked_add(offset)
            .ok_or(ScopeError::SlotOutOfRange)?;
        plans.push(plan_token(
            ctx.oracle_mappings,
            token,
            price_info,
            &mut extra_accounts,
        )?);
    }

    refresh_planned(ctx, plans)
}

/// Refresh an arbitrary list of tokens.
///
/// `accounts` starts with the price account of the first token, followed by its extra accounts
/// if its oracle type needs some, then the price account of the second token and so on.
/// All accounts are checked before the first price is written: on error nothing changes.
pub fn refresh_price_list<'a>(
    ctx: &mut RefreshAccounts<'_>,
    tokens: &[u16],
    accounts: &[AccountInfo<'a>],
) -> ScopeResult<RefreshReport> {
    // No token to refresh
    if tokens.is_empty() {
        return Err(ScopeError::EmptyTokenList);
    }

    // Check that the received token list is not too long
    if tokens.len() > MAX_ENTRIES {
        return Err(ScopeError::SlotOutOfRange);
    }
    // Check the received token list is at least as long as the number of provided accounts
    if tokens.len() > accounts.len() {
        return Err(ScopeError::AccountsAndTokenMismatch);
    }

    let mut remaining = accounts;
    let mut plans = Vec::with_capacity(tokens.len());

    for &token in tokens {
        let (received_account, rest) = remaining
            .split_first()
            .ok_or(ScopeError::AccountsAndTokenMismatch)?;
        remaining = rest;
        plans.push(plan_token(
            ctx.oracle_mappings,
            token,
            received_account,
            &mut remaining,
        )?);
    }

    refresh_planned(ctx, plans)
}

/// Resolve the mapping of `token`, check its accounts and take its extra accounts from the
/// front of `remaining`.
///
/// Nothing is written here, every error aborts the whole refresh.
fn plan_token<'p, 'a>(
    oracle_mappings: &OracleMappings,
    token: u16,
    price_info: &'p AccountInfo<'a>,
    remaining: &mut &'p [AccountInfo<'a>],
) -> ScopeResult<PlannedRefresh<'p, 'a>> {
    let token_idx = usize::from(token);
    if token_idx >= MAX_ENTRIES {
        return Err(ScopeError::SlotOutOfRange);
    }

    let entry = match oracle_mappings.get_entry(token_idx) {
        Ok(entry) => entry,
        Err(ScopeError::SlotInactive) => {
            // Ignore unset mapping accounts
            debug!("Skipping token {token_idx} as no mapping is set");
            return Ok(PlannedRefresh {
                token,
                entry: None,
                price_info,
                extra_accounts: &[],
            });
        }
        Err(e) => return Err(e),
    };

    // Check that the provided oracle account is the one referenced in the mapping
    if entry.price_info_account != *price_info.key {
        warn!(
            "Invalid price account: {}, expected: {}",
            price_info.key, entry.price_info_account
        );
        return Err(ScopeError::UnexpectedAccount);
    }

    let extra_count = entry.price_type.extra_accounts_count();
    if remaining.len() < extra_count {
        warn!(
            "Token {token_idx} of type {:?} needs {extra_count} extra accounts, {} left",
            entry.price_type,
            remaining.len()
        );
        return Err(ScopeError::AccountsAndTokenMismatch);
    }
    let (extra_accounts, rest) = remaining.split_at(extra_count);
    *remaining = rest;

    // Extra accounts are pinned in the mapping as well
    if let Some(extra) = extra_accounts
        .iter()
        .find(|extra| Some(*extra.key) != entry.extra_account)
    {
        warn!(
            "Invalid extra account: {}, expected: {:?}",
            extra.key, entry.extra_account
        );
        return Err(ScopeError::UnexpectedAccount);
    }

    Ok(PlannedRefresh {
        token,
        entry: Some(entry),
        price_info,
        extra_accounts,
    })
}

fn refresh_planned(
    ctx: &mut RefreshAccounts<'_>,
    plans: Vec<PlannedRefresh<'_, '_>>,
) -> ScopeResult<RefreshReport> {
    let mut report = RefreshReport::default();
    for plan in plans {
        report.push(refresh_token(ctx, plan)?);
    }
    Ok(report)
}

/// Decode, validate and store the price of one checked token.
///
/// Decoding and validation failures are local to the token and reported in the returned status.
fn refresh_token(
    ctx: &mut RefreshAccounts<'_>,
    plan: PlannedRefresh<'_, '_>,
) -> ScopeResult<TokenRefresh> {
    let token = plan.token;
    let token_idx = usize::from(token);
    let Some(entry) = plan.entry else {
        return Ok(TokenRefresh::skipped(token));
    };
    let price_type = entry.price_type;

    let clock = ctx.clock;
    let price = match get_price(
        price_type,
        plan.price_info,
        &mut plan.extra_accounts.iter(),
        clock,
        ctx.oracle_mappings,
        &*ctx.oracle_twaps,
        token_idx,
    )
    .and_then(|price| validate_price(ctx, token_idx, price))
    {
        Ok(price) => price,
        Err(e) => {
            warn!("Price skipped as validation failed (token {token_idx}, type {price_type:?}): {e}");
            return Ok(TokenRefresh::failed(token, price_type, e));
        }
    };

    // The engine clock dates the price, upstream times are only informative
    let mut new_price = DatedPrice::new(price.price, clock.slot, clock.unix_timestamp_u64());
    new_price.index = token;

    let to_update = ctx.oracle_prices.get_price_mut(token_idx)?;
    debug!(
        "tk {}, {:?}: {} to {} | prev_slot: {}, upstream_slot: {}, crt_slot: {}",
        token_idx,
        price_type,
        to_update.price,
        new_price.price,
        to_update.last_updated_slot,
        price.last_updated_slot,
        clock.slot,
    );
    *to_update = new_price;

    let twap_update = entry.twap_enabled.then(|| {
        let update = update_twap(ctx.oracle_twaps, token_idx, &new_price, entry.twap_window);
        if let Err(e) = &update {
            warn!("Twap update failed for token {token_idx}: {e}");
        }
        update
    });

    Ok(TokenRefresh {
        token,
        price_type: Some(price_type),
        status: RefreshStatus::Updated(new_price),
        twap_update,
    })
}

fn validate_price(
    ctx: &RefreshAccounts<'_>,
    token_idx: usize,
    price: DatedPrice,
) -> ScopeResult<DatedPrice> {
    if price.price.exp > MAX_PRICE_EXP {
        warn!(
            "Price of token {token_idx} has too many decimals: {}",
            price.price.exp
        );
        return Err(ScopeError::ExponentOverflow);
    }
    if let Some(ref_price_idx) = ctx.oracle_mappings.get_ref_price(token_idx) {
        let ref_price = ctx.oracle_prices.get_price(usize::from(ref_price_idx))?;
        check_ref_price_difference(price.price, ref_price.price).map_err(|e| {
            warn!(
                "Price of token {token_idx} ({}) is too far from its reference {ref_price_idx} ({})",
                price.price, ref_price.price
            );
            e
        })?;
    }
    Ok(price)
}
