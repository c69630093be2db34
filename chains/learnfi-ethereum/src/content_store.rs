use std::time::Duration;

use async_trait::async_trait;
use ethers::{
    core::{
        abi::{Abi, Token},
        types::{
            transaction::eip2718::TypedTransaction, Address, Bytes, TransactionRequest, H256, U256,
        },
    },
    providers::{JsonRpcClient, Middleware, Provider, RpcError},
    signers::{LocalWallet, Signer},
};
use tracing::{info, instrument};

use learnfi_core::{
    traits::{ContentStore, TxOutcome},
    ContentPayload, PublishError, Stage, StagedError,
};

/// Name of the registry method every payload is submitted to
const CREATE_CONTENT: &str = "createContent";

/// An unsigned `createContent` call with sender, nonce, and fee fields
/// populated. Built once per payload; the nonce inside is only as fresh as
/// the moment `build` returned, so sign and submit promptly.
#[derive(Debug, Clone)]
pub struct UnsignedTx {
    /// The populated transaction
    pub tx: TypedTransaction,
}

/// A signed registry call ready for broadcast. Submitted exactly once.
#[derive(Debug, Clone)]
pub struct SignedTx {
    /// The transaction that was signed
    pub tx: TypedTransaction,
    /// RLP-encoded transaction bytes, signature included
    pub raw: Bytes,
}

/// A reference to the LearnFi content registry deployed on some
/// Ethereum-compatible chain, plus the key it publishes with.
#[derive(Debug)]
pub struct ContentRegistry<P> {
    name: String,
    address: Address,
    abi: Abi,
    provider: Provider<P>,
    wallet: LocalWallet,
    gas_limit: U256,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl<P> ContentRegistry<P>
where
    P: JsonRpcClient + 'static,
{
    /// Create a reference to a registry at a specific address on some chain.
    ///
    /// `gas_limit` is a fixed upper bound per call, not an estimate. It
    /// trades efficiency for simplicity; raise it in settings if registry
    /// calls start running out of gas. The wallet must already carry the
    /// chain id the provider is connected to.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        address: Address,
        abi: Abi,
        provider: Provider<P>,
        wallet: LocalWallet,
        gas_limit: u64,
        confirmation_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            name: name.to_owned(),
            address,
            abi,
            provider,
            wallet,
            gas_limit: gas_limit.into(),
            confirmation_timeout,
            poll_interval,
        }
    }

    /// Build an unsigned `createContent` call for a payload.
    ///
    /// The sender's transaction count is fetched fresh on every call, right
    /// before signing, to keep the stale-nonce window small. Sequential
    /// builds from the same sender therefore carry strictly increasing
    /// nonces; concurrent builds would not, which is why the pipeline is
    /// serialized.
    #[instrument(err)]
    pub async fn build(&self, payload: &ContentPayload) -> Result<UnsignedTx, PublishError> {
        payload.validate()?;

        let from = self.wallet.address();
        let nonce = self.provider.get_transaction_count(from, None).await?;
        let gas_price = self.provider.get_gas_price().await?;
        let data = self.calldata(payload)?;

        let tx = TransactionRequest::new()
            .from(from)
            .to(self.address)
            .nonce(nonce)
            .gas(self.gas_limit)
            .gas_price(gas_price)
            .data(data)
            .chain_id(self.wallet.chain_id());

        Ok(UnsignedTx { tx: tx.into() })
    }

    fn calldata(&self, payload: &ContentPayload) -> Result<Vec<u8>, PublishError> {
        let function = self.abi.function(CREATE_CONTENT)?;
        let tags = payload.tags.iter().cloned().map(Token::String).collect();
        let args = [
            Token::String(payload.content_hash.clone()),
            Token::Uint(payload.content_type.as_u8().into()),
            Token::Array(tags),
        ];
        Ok(function.encode_input(&args)?)
    }

    /// Sign an unsigned call with the held key. Deterministic: the same key
    /// and transaction always produce the same raw bytes. The key never
    /// leaves this struct and is never logged.
    pub fn sign(&self, unsigned: &UnsignedTx) -> Result<SignedTx, PublishError> {
        if unsigned.tx.from() != Some(&self.wallet.address()) {
            return Err(PublishError::SigningError(format!(
                "transaction sender {:?} does not match wallet address {:?}",
                unsigned.tx.from(),
                self.wallet.address()
            )));
        }

        let signature = self
            .wallet
            .sign_transaction_sync(&unsigned.tx)
            .map_err(|e| PublishError::SigningError(e.to_string()))?;

        Ok(SignedTx {
            raw: unsigned.tx.rlp_signed(&signature),
            tx: unsigned.tx.clone(),
        })
    }

    /// Broadcast a signed call and block until a receipt is found or the
    /// confirmation window closes.
    ///
    /// An immediate JSON-RPC rejection becomes `SubmissionRejected`. A
    /// missing receipt becomes `ConfirmationTimeout`; the transaction may
    /// still land later, so callers should re-query via `status` rather
    /// than resubmit.
    #[instrument(err, skip(signed))]
    pub async fn submit(&self, signed: &SignedTx) -> Result<TxOutcome, PublishError> {
        let pending = match self.provider.send_raw_transaction(signed.raw.clone()).await {
            Ok(pending) => pending,
            Err(e) => {
                return Err(match e.as_error_response() {
                    Some(rpc) => PublishError::SubmissionRejected(rpc.message.clone()),
                    None => e.into(),
                })
            }
        };
        let txid: H256 = *pending;
        info!(?txid, "Broadcast createContent call");

        tokio::time::timeout(self.confirmation_timeout, self.wait_for_receipt(txid))
            .await
            .map_err(|_| PublishError::ConfirmationTimeout(txid))?
    }

    async fn wait_for_receipt(&self, txid: H256) -> Result<TxOutcome, PublishError> {
        let mut interval = tokio::time::interval(self.poll_interval);
        loop {
            interval.tick().await;
            if let Some(receipt) = self.provider.get_transaction_receipt(txid).await? {
                return Ok(receipt.into());
            }
        }
    }
}

#[async_trait]
impl<P> ContentStore for ContentRegistry<P>
where
    P: JsonRpcClient + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn publisher(&self) -> Address {
        self.wallet.address()
    }

    async fn publish(&self, payload: &ContentPayload) -> Result<TxOutcome, StagedError> {
        let unsigned = self.build(payload).await.map_err(|e| e.at(Stage::Build))?;
        let signed = self.sign(&unsigned).map_err(|e| e.at(Stage::Sign))?;
        self.submit(&signed).await.map_err(|e| e.at(Stage::Submit))
    }

    async fn status(&self, txid: H256) -> Result<Option<TxOutcome>, PublishError> {
        Ok(self
            .provider
            .get_transaction_receipt(txid)
            .await?
            .map(Into::into))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ethers::{
        core::types::{NameOrAddress, TransactionReceipt},
        providers::{JsonRpcError, MockProvider, MockResponse},
    };
    use learnfi_core::ContentType;

    const REGISTRY_ABI: &str = r#"[
        {
            "type": "function",
            "name": "createContent",
            "inputs": [
                { "name": "contentHash", "type": "string" },
                { "name": "contentType", "type": "uint8" },
                { "name": "tags", "type": "string[]" }
            ],
            "outputs": [],
            "stateMutability": "nonpayable"
        }
    ]"#;

    const REGISTRY_ADDRESS: Address = Address::repeat_byte(0x22);

    fn registry(
        confirmation_timeout: Duration,
        poll_interval: Duration,
    ) -> (ContentRegistry<MockProvider>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        let abi: Abi = serde_json::from_str(REGISTRY_ABI).expect("!abi");
        let wallet: LocalWallet =
            "1111111111111111111111111111111111111111111111111111111111111111"
                .parse()
                .expect("!wallet");

        let registry = ContentRegistry::new(
            "test",
            REGISTRY_ADDRESS,
            abi,
            provider,
            wallet.with_chain_id(31337u64),
            2_000_000,
            confirmation_timeout,
            poll_interval,
        );
        (registry, mock)
    }

    fn payload() -> ContentPayload {
        ContentPayload {
            content_hash: "QmTest123".to_owned(),
            content_type: ContentType::Video,
            tags: vec!["education".to_owned(), "crypto".to_owned()],
        }
    }

    #[tokio::test]
    async fn it_builds_with_fresh_nonces() {
        let (registry, mock) = registry(Duration::from_secs(1), Duration::from_millis(10));

        // LIFO: the nonce request is served first
        mock.push(U256::from(30_000_000_000u64)).unwrap();
        mock.push(U256::from(7)).unwrap();
        let first = registry.build(&payload()).await.expect("!build");

        assert_eq!(first.tx.nonce(), Some(&U256::from(7)));
        assert_eq!(first.tx.gas(), Some(&U256::from(2_000_000)));
        assert_eq!(
            first.tx.to(),
            Some(&NameOrAddress::Address(REGISTRY_ADDRESS))
        );

        let abi: Abi = serde_json::from_str(REGISTRY_ABI).unwrap();
        let selector = abi.function("createContent").unwrap().short_signature();
        let data = first.tx.data().expect("!data");
        assert_eq!(&data[..4], &selector);

        mock.push(U256::from(30_000_000_000u64)).unwrap();
        mock.push(U256::from(8)).unwrap();
        let second = registry.build(&payload()).await.expect("!build");

        assert!(second.tx.nonce().unwrap() > first.tx.nonce().unwrap());
    }

    #[tokio::test]
    async fn it_rejects_bad_payloads_before_touching_the_chain() {
        // No responses queued: any RPC call would error differently
        let (registry, _mock) = registry(Duration::from_secs(1), Duration::from_millis(10));

        let mut bad = payload();
        bad.content_hash.clear();

        let err = registry.build(&bad).await.unwrap_err();
        assert!(matches!(err, PublishError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn it_signs_deterministically() {
        let (registry, mock) = registry(Duration::from_secs(1), Duration::from_millis(10));

        mock.push(U256::from(30_000_000_000u64)).unwrap();
        mock.push(U256::from(0)).unwrap();
        let unsigned = registry.build(&payload()).await.expect("!build");

        let first = registry.sign(&unsigned).expect("!sign");
        let second = registry.sign(&unsigned).expect("!sign");
        assert_eq!(first.raw, second.raw);
    }

    #[tokio::test]
    async fn it_refuses_to_sign_for_another_sender() {
        let (registry, _mock) = registry(Duration::from_secs(1), Duration::from_millis(10));

        let tx = TransactionRequest::new()
            .from(Address::repeat_byte(0x99))
            .to(REGISTRY_ADDRESS)
            .nonce(0u64)
            .gas(2_000_000u64)
            .gas_price(1u64)
            .chain_id(31337u64);
        let unsigned = UnsignedTx { tx: tx.into() };

        let err = registry.sign(&unsigned).unwrap_err();
        assert!(matches!(err, PublishError::SigningError(_)));
    }

    #[tokio::test]
    async fn it_times_out_without_a_receipt() {
        let (registry, mock) = registry(Duration::from_millis(200), Duration::from_millis(50));

        // Reverse order of service: receipt polls (all pending), broadcast
        // response, gas price, nonce
        for _ in 0..64 {
            mock.push(serde_json::Value::Null).unwrap();
        }
        mock.push(H256::repeat_byte(0xab)).unwrap();
        mock.push(U256::from(30_000_000_000u64)).unwrap();
        mock.push(U256::from(0)).unwrap();

        let unsigned = registry.build(&payload()).await.expect("!build");
        let signed = registry.sign(&unsigned).expect("!sign");

        let err = registry.submit(&signed).await.unwrap_err();
        assert!(matches!(err, PublishError::ConfirmationTimeout(_)));
    }

    #[tokio::test]
    async fn it_surfaces_broadcast_rejections() {
        let (registry, mock) = registry(Duration::from_secs(1), Duration::from_millis(10));

        mock.push_response(MockResponse::Error(JsonRpcError {
            code: -32000,
            message: "insufficient funds for gas * price + value".to_owned(),
            data: None,
        }));
        mock.push(U256::from(30_000_000_000u64)).unwrap();
        mock.push(U256::from(0)).unwrap();

        let unsigned = registry.build(&payload()).await.expect("!build");
        let signed = registry.sign(&unsigned).expect("!sign");

        let err = registry.submit(&signed).await.unwrap_err();
        match err {
            PublishError::SubmissionRejected(msg) => {
                assert!(msg.contains("insufficient funds"))
            }
            other => panic!("expected SubmissionRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn it_publishes_end_to_end() {
        let (registry, mock) = registry(Duration::from_secs(1), Duration::from_millis(10));

        let txid = H256::repeat_byte(0xab);
        let receipt = TransactionReceipt {
            transaction_hash: txid,
            status: Some(1u64.into()),
            block_number: Some(12u64.into()),
            ..Default::default()
        };
        mock.push(receipt).unwrap();
        mock.push(txid).unwrap();
        mock.push(U256::from(30_000_000_000u64)).unwrap();
        mock.push(U256::from(3)).unwrap();

        let outcome = registry.publish(&payload()).await.expect("!publish");
        assert_eq!(outcome.txid, txid);
        assert!(outcome.executed);
        assert_eq!(outcome.block_number, Some(12));
    }
}
