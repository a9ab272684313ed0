use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use solana_program::{hash::Hash, pubkey::Pubkey};
use solana_sdk::{signature::Signature, transaction::Transaction};

use crate::{
    error::{ClaimError, Result},
    rpc_utils::{AccountFetcher, ClaimRpc},
};

/// In-memory cluster used by unit tests
#[derive(Default)]
pub struct InMemoryAccounts {
    accounts: HashMap<Pubkey, Vec<u8>>,
    fetches: AtomicUsize,
    blockhash_requests: AtomicUsize,
    fail_send: bool,
    token_balance: u64,
    sent: Mutex<Vec<Transaction>>,
}

impl InMemoryAccounts {
    pub fn with_account(mut self, address: Pubkey, data: Vec<u8>) -> Self {
        self.accounts.insert(address, data);
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn with_token_balance(mut self, token_balance: u64) -> Self {
        self.token_balance = token_balance;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn blockhash_requests(&self) -> usize {
        self.blockhash_requests.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountFetcher for InMemoryAccounts {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.get(address).cloned())
    }
}

#[async_trait]
impl ClaimRpc for InMemoryAccounts {
    async fn get_latest_blockhash(&self) -> Result<Hash> {
        self.blockhash_requests.fetch_add(1, Ordering::SeqCst);
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        if self.fail_send {
            return Err(ClaimError::Transport("connection reset".to_string()));
        }
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    async fn get_token_account_balance(&self, _address: &Pubkey) -> Result<u64> {
        Ok(self.token_balance)
    }
}
