//! # Showroom API
//!
//! Typed endpoints over the cache and transport.
//!
//! ## Read / Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ShowroomApi                                    │
//! │                                                                         │
//! │  READ   branches() ─► CacheKey("branches", "") + [Branches]             │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   QueryCache::query ──miss──► HttpTransport::send       │
//! │                                                                         │
//! │  WRITE  create_sale(draft)                                              │
//! │           1. role gate (Forbidden, no request)                          │
//! │           2. form validation (Validation, no request)                   │
//! │           3. QueryCache::mutate([SalesRecords, VehicleStock,            │
//! │                                  Customers, Dashboard], send)           │
//! │              └─ on success those tags go stale                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tags
//!
//! | Read | Tags |
//! |------|------|
//! | `auth/me` | Profile |
//! | `branches` | Branches |
//! | `vehicle-stock` | VehicleStock |
//! | `sales-records` | SalesRecords, VehicleStock |
//! | `customers` | Customers |
//! | `imports/jobs` | ImportJobs |
//! | `anomalies/open` | Anomalies |
//! | `payments/pending`, `payments/sale/{id}` | Payments |
//! | `transfers/open` | Transfers |
//! | `reports/summary` | Dashboard, SalesRecords |

use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use showroom_core::filters::{CustomerFilter, QueryParams, SalesFilter, VehicleStockFilter};
use showroom_core::validation;
use showroom_core::{
    AnalyticsMemo, AnomalyRecord, Branch, Capability, Customer, CustomerDraft, CustomerPatch,
    DashboardMetrics, DashboardSummary, ImportJob, ImportUpload, PaymentRecord, SaleDraft, SalePatch,
    SalesRecord, StockAdjustment, StockImportSummary, TokenPair, TransferRecord, TransferStatus,
    TransferStatusUpdate, UserProfile, VehicleStock, VehicleStockDraft, VehicleStockPatch,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, QueryCache, Tag};
use crate::error::{ApiError, ApiResult};
use crate::session::{AuthStatus, SessionStore};
use crate::transport::{ApiRequest, HttpTransport};

/// How list reads treat a stored value that is no longer fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Wait for a refetch when the stored value is stale.
    #[default]
    Fresh,
    /// Return the stored value at once and refresh in the background.
    StaleWhileRevalidate,
}

/// The three collections the dashboard is computed from.
#[derive(Debug, Clone)]
pub struct DashboardInputs {
    pub stock: Arc<Vec<VehicleStock>>,
    pub sales: Arc<Vec<SalesRecord>>,
    pub branches: Arc<Vec<Branch>>,
}

/// Typed access to the dealership backend.
#[derive(Debug, Clone)]
pub struct ShowroomApi {
    transport: HttpTransport,
    cache: QueryCache,
    session: Arc<SessionStore>,
    memo: Arc<Mutex<AnalyticsMemo>>,
    freshness: Freshness,
}

impl ShowroomApi {
    pub fn new(transport: HttpTransport, cache: QueryCache) -> Self {
        let session = Arc::clone(transport.session());
        ShowroomApi {
            transport,
            cache,
            session,
            memo: Arc::new(Mutex::new(AnalyticsMemo::new())),
            freshness: Freshness::default(),
        }
    }

    pub fn with_freshness(mut self, freshness: Freshness) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Signs in and loads the profile.
    ///
    /// Any failure along the way leaves the session cleared.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<UserProfile> {
        self.session.clear_auth().await;
        self.session.set_status(AuthStatus::Loading).await;

        let result = self.login_inner(username, password).await;
        match &result {
            Ok(profile) => info!(user_id = profile.id, role = %profile.user_role, "Signed in"),
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                self.session.clear_auth().await;
                self.session.set_status(AuthStatus::Error).await;
            }
        }
        result
    }

    async fn login_inner(&self, username: &str, password: &str) -> ApiResult<UserProfile> {
        let request = ApiRequest::post("auth/login").form(vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ]);
        let tokens: TokenPair = self.transport.send(request).await?;
        self.session.set_credentials(&tokens).await;

        // Nothing read under the previous credentials survives a sign-in.
        self.cache.reset().await;
        self.memo.lock().await.clear();
        let profile = self.current_profile().await?;
        self.session.set_user(Some(profile.as_ref().clone())).await;
        Ok(profile.as_ref().clone())
    }

    /// Loads the profile when a token exists but no profile is known.
    ///
    /// A failure clears the session. Returns the profile, if signed in.
    pub async fn ensure_profile(&self) -> ApiResult<Option<UserProfile>> {
        let state = self.session.snapshot().await;
        if state.access_token.is_none() {
            return Ok(None);
        }
        if let Some(user) = state.user {
            return Ok(Some(user));
        }

        match self.current_profile().await {
            Ok(profile) => {
                self.session.set_user(Some(profile.as_ref().clone())).await;
                Ok(Some(profile.as_ref().clone()))
            }
            Err(e) => {
                self.session.clear_auth().await;
                Err(e)
            }
        }
    }

    /// Exchanges the current access token for a new pair.
    pub async fn refresh_session(&self) -> ApiResult<()> {
        let tokens: TokenPair = self.transport.send(ApiRequest::post("auth/refresh")).await?;
        self.session.set_credentials(&tokens).await;
        debug!("Session tokens refreshed");
        Ok(())
    }

    /// Signs out locally and forgets every cached read.
    pub async fn logout(&self) {
        self.session.clear_auth().await;
        self.cache.reset().await;
        self.memo.lock().await.clear();
        info!("Signed out");
    }

    /// Refuses the action when the signed-in role lacks `capability`.
    ///
    /// Without a known profile the backend is left to decide.
    pub async fn require(&self, capability: Capability) -> ApiResult<()> {
        if let Some(user) = self.session.user().await {
            if !user.user_role.permissions().allows(capability) {
                warn!(role = %user.user_role, action = capability.description(), "Action refused by role");
                return Err(ApiError::Forbidden(capability.description().to_string()));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn profile(&self) -> ApiResult<Arc<UserProfile>> {
        self.read(ApiRequest::get("auth/me"), String::new(), &[Tag::Profile])
            .await
    }

    /// The profile the session is about to trust. Never served stale.
    async fn current_profile(&self) -> ApiResult<Arc<UserProfile>> {
        self.read_as(Freshness::Fresh, ApiRequest::get("auth/me"), String::new(), &[Tag::Profile])
            .await
    }

    pub async fn branches(&self) -> ApiResult<Arc<Vec<Branch>>> {
        self.read(ApiRequest::get("branches"), String::new(), &[Tag::Branches])
            .await
    }

    pub async fn vehicle_stock(&self, filter: &VehicleStockFilter) -> ApiResult<Arc<Vec<VehicleStock>>> {
        self.read_filtered("vehicle-stock", filter, &[Tag::VehicleStock])
            .await
    }

    pub async fn sales_records(&self, filter: &SalesFilter) -> ApiResult<Arc<Vec<SalesRecord>>> {
        self.read_filtered("sales-records", filter, &[Tag::SalesRecords, Tag::VehicleStock])
            .await
    }

    pub async fn customers(&self, filter: &CustomerFilter) -> ApiResult<Arc<Vec<Customer>>> {
        self.read_filtered("customers", filter, &[Tag::Customers])
            .await
    }

    pub async fn import_jobs(&self) -> ApiResult<Arc<Vec<ImportJob>>> {
        self.read(ApiRequest::get("imports/jobs"), String::new(), &[Tag::ImportJobs])
            .await
    }

    pub async fn open_anomalies(&self) -> ApiResult<Arc<Vec<AnomalyRecord>>> {
        self.read(ApiRequest::get("anomalies/open"), String::new(), &[Tag::Anomalies])
            .await
    }

    pub async fn pending_payments(&self) -> ApiResult<Arc<Vec<PaymentRecord>>> {
        self.read(ApiRequest::get("payments/pending"), String::new(), &[Tag::Payments])
            .await
    }

    pub async fn sale_payments(&self, sale_id: i64) -> ApiResult<Arc<Vec<PaymentRecord>>> {
        let path = format!("payments/sale/{}", sale_id);
        self.read(ApiRequest::get(path), String::new(), &[Tag::Payments])
            .await
    }

    pub async fn open_transfers(&self) -> ApiResult<Arc<Vec<TransferRecord>>> {
        self.read(ApiRequest::get("transfers/open"), String::new(), &[Tag::Transfers])
            .await
    }

    pub async fn dashboard_summary(&self) -> ApiResult<Arc<DashboardSummary>> {
        self.read(
            ApiRequest::get("reports/summary"),
            String::new(),
            &[Tag::Dashboard, Tag::SalesRecords],
        )
        .await
    }

    /// Downloads the stock workbook. Never cached.
    pub async fn export_vehicle_stock(&self) -> ApiResult<Vec<u8>> {
        self.require(Capability::ImportExport).await?;
        self.transport
            .send_raw(ApiRequest::get("vehicle-stock/export"))
            .await
    }

    /// The sales filter a role's sales screen uses by default.
    pub async fn default_sales_filter(&self) -> SalesFilter {
        let limit = match self.session.user().await {
            Some(user) => user.user_role.permissions().sales_page_limit,
            None => showroom_core::UserRole::Salesman.permissions().sales_page_limit,
        };
        SalesFilter {
            limit: Some(limit),
            ..Default::default()
        }
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Fetches stock, sales and branches concurrently.
    pub async fn dashboard_inputs(&self) -> ApiResult<DashboardInputs> {
        let stock_filter = VehicleStockFilter::default();
        let sales_filter = self.default_sales_filter().await;
        let (stock, sales, branches) = tokio::try_join!(
            self.vehicle_stock(&stock_filter),
            self.sales_records(&sales_filter),
            self.branches(),
        )?;
        Ok(DashboardInputs { stock, sales, branches })
    }

    /// Dashboard metrics, recomputed only when an input was refetched or the
    /// reporting month changed.
    pub async fn dashboard(&self, now: DateTime<FixedOffset>) -> ApiResult<Arc<DashboardMetrics>> {
        let inputs = self.dashboard_inputs().await?;
        let mut memo = self.memo.lock().await;
        Ok(memo.get_or_compute(&inputs.stock, &inputs.sales, &inputs.branches, now))
    }

    /// How many times the dashboard has actually been computed.
    pub async fn dashboard_computations(&self) -> u64 {
        self.memo.lock().await.computations()
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub async fn create_customer(&self, draft: &CustomerDraft) -> ApiResult<Customer> {
        validation::validate_customer_draft(draft)?;
        let request = ApiRequest::post("customers").json(draft)?;
        self.write(&[Tag::Customers], request).await
    }

    pub async fn update_customer(&self, id: i64, patch: &CustomerPatch) -> ApiResult<Customer> {
        if let Some(name) = &patch.name {
            validation::validate_name("name", name)?;
        }
        let request = ApiRequest::patch(format!("customers/{}", id)).json(patch)?;
        self.write(&[Tag::Customers], request).await
    }

    pub async fn delete_customer(&self, id: i64) -> ApiResult<()> {
        self.require(Capability::DeleteCustomers).await?;
        self.write_empty(&[Tag::Customers], ApiRequest::delete(format!("customers/{}", id)))
            .await
    }

    // =========================================================================
    // Vehicle Stock
    // =========================================================================

    pub async fn create_vehicle_stock(&self, draft: &VehicleStockDraft) -> ApiResult<VehicleStock> {
        self.require(Capability::ManageStock).await?;
        validation::validate_stock_draft(draft)?;
        let request = ApiRequest::post("vehicle-stock").json(draft)?;
        self.write(&[Tag::VehicleStock], request).await
    }

    pub async fn update_vehicle_stock(&self, id: i64, patch: &VehicleStockPatch) -> ApiResult<VehicleStock> {
        self.require(Capability::ManageStock).await?;
        validation::validate_stock_patch(patch)?;
        let request = ApiRequest::patch(format!("vehicle-stock/{}", id)).json(patch)?;
        self.write(&[Tag::VehicleStock], request).await
    }

    /// Adds `adjustment` (may be negative) to a row's quantity.
    pub async fn adjust_vehicle_stock(&self, id: i64, adjustment: i64) -> ApiResult<VehicleStock> {
        self.require(Capability::ManageStock).await?;
        let body = StockAdjustment { adjustment };
        validation::validate_adjustment(&body)?;
        let request = ApiRequest::post(format!("vehicle-stock/{}/adjust", id)).json(&body)?;
        self.write(&[Tag::VehicleStock], request).await
    }

    pub async fn delete_vehicle_stock(&self, id: i64) -> ApiResult<()> {
        self.require(Capability::ManageStock).await?;
        self.write_empty(&[Tag::VehicleStock], ApiRequest::delete(format!("vehicle-stock/{}", id)))
            .await
    }

    /// Re-imports the server-side workbook.
    pub async fn import_vehicle_stock(&self) -> ApiResult<StockImportSummary> {
        self.require(Capability::ImportExport).await?;
        self.write(&[Tag::VehicleStock, Tag::Branches], ApiRequest::post("vehicle-stock/import"))
            .await
    }

    /// Uploads a workbook as a new import job.
    pub async fn upload_import(&self, upload: ImportUpload) -> ApiResult<ImportJob> {
        self.require(Capability::ImportExport).await?;
        if upload.file_name.trim().is_empty() {
            return Err(showroom_core::ValidationError::Required {
                field: "file".to_string(),
            }
            .into());
        }
        let request = ApiRequest::post("imports/upload").multipart(upload);
        self.write(&[Tag::ImportJobs, Tag::VehicleStock], request).await
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Captures a sale. The backend decrements stock and may create the customer.
    pub async fn create_sale(&self, draft: &SaleDraft) -> ApiResult<SalesRecord> {
        validation::validate_sale_draft(draft)?;
        let request = ApiRequest::post("sales-records").json(draft)?;
        self.write(
            &[Tag::SalesRecords, Tag::VehicleStock, Tag::Customers, Tag::Dashboard],
            request,
        )
        .await
    }

    pub async fn update_sale(&self, id: i64, patch: &SalePatch) -> ApiResult<SalesRecord> {
        if let Some(amount) = &patch.amount_received {
            validation::validate_amount("amount_received", amount)?;
        }
        let request = ApiRequest::patch(format!("sales-records/{}", id)).json(patch)?;
        self.write(&[Tag::SalesRecords, Tag::Dashboard], request).await
    }

    /// Flips the payment-received flag.
    pub async fn mark_sale_paid(&self, id: i64, received: bool) -> ApiResult<SalesRecord> {
        self.update_sale(id, &SalePatch::payment_received(received)).await
    }

    /// Deletes a sale. The backend restores its stock.
    pub async fn delete_sale(&self, id: i64) -> ApiResult<()> {
        self.require(Capability::DeleteSales).await?;
        self.write_empty(
            &[Tag::SalesRecords, Tag::VehicleStock, Tag::Dashboard],
            ApiRequest::delete(format!("sales-records/{}", id)),
        )
        .await
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    pub async fn update_transfer_status(&self, id: i64, status: TransferStatus) -> ApiResult<TransferRecord> {
        let request =
            ApiRequest::patch(format!("transfers/{}/status", id)).json(&TransferStatusUpdate { status })?;
        self.write(&[Tag::Transfers], request).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn read_filtered<T, P>(&self, endpoint: &str, filter: &P, tags: &[Tag]) -> ApiResult<Arc<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
        P: QueryParams,
    {
        let request = ApiRequest::get(endpoint).query(filter.query_pairs());
        self.read(request, filter.canonical_query(), tags).await
    }

    async fn read<T>(&self, request: ApiRequest, params: String, tags: &[Tag]) -> ApiResult<Arc<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        self.read_as(self.freshness, request, params, tags).await
    }

    async fn read_as<T>(
        &self,
        freshness: Freshness,
        request: ApiRequest,
        params: String,
        tags: &[Tag],
    ) -> ApiResult<Arc<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let key = CacheKey::new(request.path.clone(), params);
        let transport = self.transport.clone();
        let fetch = move || {
            let transport = transport.clone();
            let request = request.clone();
            async move { transport.send::<T>(request).await }
        };

        match freshness {
            Freshness::Fresh => self.cache.query(key, tags, fetch).await,
            Freshness::StaleWhileRevalidate => self.cache.query_swr(key, tags, fetch).await,
        }
    }

    async fn write<T: DeserializeOwned>(&self, tags: &[Tag], request: ApiRequest) -> ApiResult<T> {
        self.cache.mutate(tags, self.transport.send(request)).await
    }

    async fn write_empty(&self, tags: &[Tag], request: ApiRequest) -> ApiResult<()> {
        self.cache.mutate(tags, self.transport.send_empty(request)).await
    }
}
