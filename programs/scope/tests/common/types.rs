use std::collections::HashMap;

use scope::{
    AccountInfo, Clock, DatedPrice, MappingOptions, OracleType, Pubkey, RefreshReport, ScopeFeed,
    ScopeResult, TokenRefresh, REFRESH_BATCH_SIZE,
};

pub const START_TIMESTAMP: i64 = 1_700_000_000;
pub const START_SLOT: u64 = 250_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestOracleType {
    Pyth,
    PythEMA,
    SwitchboardV1,
    SwitchboardV2,
    YiToken,
    CToken,
    SplStake,
    KToken,
    MsolStake,
}

impl TestOracleType {
    pub const ALL: [TestOracleType; 9] = [
        TestOracleType::Pyth,
        TestOracleType::PythEMA,
        TestOracleType::SwitchboardV1,
        TestOracleType::SwitchboardV2,
        TestOracleType::YiToken,
        TestOracleType::CToken,
        TestOracleType::SplStake,
        TestOracleType::KToken,
        TestOracleType::MsolStake,
    ];

    pub fn to_oracle_type(self) -> OracleType {
        match self {
            TestOracleType::Pyth => OracleType::Pyth,
            TestOracleType::PythEMA => OracleType::PythEMA,
            TestOracleType::SwitchboardV1 => OracleType::SwitchboardV1,
            TestOracleType::SwitchboardV2 => OracleType::SwitchboardV2,
            TestOracleType::YiToken => OracleType::YiToken,
            TestOracleType::CToken => OracleType::CToken,
            TestOracleType::SplStake => OracleType::SplStake,
            TestOracleType::KToken => OracleType::KToken,
            TestOracleType::MsolStake => OracleType::MsolStake,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OracleConf {
    pub token: u16,
    pub price_type: TestOracleType,
    pub pubkey: Pubkey,
    /// Accounts read after `pubkey` by the oracle (Yi mint)
    pub extra_pubkeys: Vec<Pubkey>,
    pub options: MappingOptions,
}

impl OracleConf {
    pub fn new(token: u16, price_type: TestOracleType) -> Self {
        let extra_pubkeys: Vec<Pubkey> = (0..price_type.to_oracle_type().extra_accounts_count())
            .map(|_| Pubkey::new_unique())
            .collect();
        Self {
            token,
            price_type,
            pubkey: Pubkey::new_unique(),
            options: MappingOptions {
                extra_account: extra_pubkeys.first().copied(),
                ..Default::default()
            },
            extra_pubkeys,
        }
    }

    pub fn with_twap(mut self, window: u8) -> Self {
        self.options.twap_enabled = true;
        self.options.twap_window = Some(window);
        self
    }

    pub fn with_ref_price(mut self, ref_price: u16) -> Self {
        self.options.ref_price = Some(ref_price);
        self
    }

    pub fn idx(&self) -> usize {
        usize::from(self.token)
    }

    /// Keys to provide when refreshing this token: the price account then its extra accounts.
    pub fn refresh_keys(&self) -> Vec<Pubkey> {
        std::iter::once(self.pubkey)
            .chain(self.extra_pubkeys.iter().copied())
            .collect()
    }
}

/// A feed with the raw accounts it reads and a controllable clock.
pub struct TestContext {
    pub admin: Pubkey,
    pub feed: ScopeFeed,
    pub clock: Clock,
    accounts: HashMap<Pubkey, Vec<u8>>,
}

fn lookup<'a>(accounts: &'a HashMap<Pubkey, Vec<u8>>, key: &Pubkey) -> &'a [u8] {
    accounts.get(key).map(Vec::as_slice).unwrap_or(&[])
}

impl TestContext {
    pub fn new(admin: Pubkey, feed: ScopeFeed) -> Self {
        Self {
            admin,
            feed,
            clock: Clock {
                slot: START_SLOT,
                epoch_start_timestamp: START_TIMESTAMP,
                epoch: 580,
                unix_timestamp: START_TIMESTAMP,
            },
            accounts: HashMap::new(),
        }
    }

    pub fn set_account(&mut self, address: &Pubkey, data: Vec<u8>) {
        self.accounts.insert(*address, data);
    }

    pub fn account_data(&self, address: &Pubkey) -> &[u8] {
        lookup(&self.accounts, address)
    }

    /// Stored price and number of TWAP samples of each of `tokens`.
    pub fn snapshot(&self, tokens: &[u16]) -> Vec<(DatedPrice, usize)> {
        tokens
            .iter()
            .map(|&token| {
                let idx = usize::from(token);
                let price = self.feed.get_dated_price(idx).unwrap();
                let samples = self.feed.oracle_twaps().get_twap(idx).unwrap().len();
                (price, samples)
            })
            .collect()
    }

    pub fn now(&self) -> i64 {
        self.clock.unix_timestamp
    }

    /// Move the clock forward, slots go by every 400ms.
    pub fn advance_seconds(&mut self, seconds: i64) {
        self.clock.unix_timestamp += seconds;
        self.clock.slot += u64::try_from(seconds * 5 / 2).unwrap();
    }

    pub fn refresh(&mut self, conf: &OracleConf) -> ScopeResult<TokenRefresh> {
        self.refresh_with(conf.token, &conf.pubkey, &conf.extra_pubkeys)
    }

    /// Refresh `token` with arbitrary accounts.
    pub fn refresh_with(
        &mut self,
        token: u16,
        price_key: &Pubkey,
        extra_keys: &[Pubkey],
    ) -> ScopeResult<TokenRefresh> {
        let accounts = &self.accounts;
        let price_info = AccountInfo::new(price_key, lookup(accounts, price_key));
        let extras: Vec<AccountInfo> = extra_keys
            .iter()
            .map(|key| AccountInfo::new(key, lookup(accounts, key)))
            .collect();
        self.feed
            .refresh_one(&self.clock, token, &price_info, &extras)
    }

    pub fn refresh_batch(
        &mut self,
        first_token: u16,
        keys: &[Pubkey; REFRESH_BATCH_SIZE],
        extra_keys: &[Pubkey],
    ) -> ScopeResult<RefreshReport> {
        let accounts = &self.accounts;
        let price_infos: [AccountInfo; REFRESH_BATCH_SIZE] =
            std::array::from_fn(|i| AccountInfo::new(&keys[i], lookup(accounts, &keys[i])));
        let extras: Vec<AccountInfo> = extra_keys
            .iter()
            .map(|key| AccountInfo::new(key, lookup(accounts, key)))
            .collect();
        self.feed
            .refresh_batch(&self.clock, first_token, &price_infos, &extras)
    }

    pub fn refresh_list(&mut self, tokens: &[u16], keys: &[Pubkey]) -> ScopeResult<RefreshReport> {
        let accounts = &self.accounts;
        let infos: Vec<AccountInfo> = keys
            .iter()
            .map(|key| AccountInfo::new(key, lookup(accounts, key)))
            .collect();
        self.feed.refresh_list(&self.clock, tokens, &infos)
    }

    /// Refresh the list of tokens described by `confs`, in order.
    pub fn refresh_confs(&mut self, confs: &[&OracleConf]) -> ScopeResult<RefreshReport> {
        let tokens: Vec<u16> = confs.iter().map(|c| c.token).collect();
        let keys: Vec<Pubkey> = confs.iter().flat_map(|c| c.refresh_keys()).collect();
        self.refresh_list(&tokens, &keys)
    }
}
