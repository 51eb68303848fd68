//! Per-quote ops health rows for the staff inbox.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use database::destination::{self, DestinationFields};
use database::offer::{self, OfferFields};
use database::quote::{self, QuoteFields, QuotePageQuery};
use database::{message, Database, DestinationRecord, MessageReplyRollup, OfferRecord, QuoteRecord};
use ops_core::{
    aggregate, evaluate, DestinationStatus, IntroRequestState, NeedsActionReason,
    SchemaCapabilityProvider, SlaConfig,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::degrade::WarnOnce;
use crate::ledger::EventLedger;
use crate::sla_config::SlaConfigProvider;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

const QUOTE_COLUMNS: &[&str] = &["id", "status", "selected_offer_id", "created_at"];
const DESTINATION_COLUMNS: &[&str] = &["id", "quote_id", "provider_id", "status", "created_at"];
const OFFER_COLUMNS: &[&str] = &["id", "quote_id", "provider_id", "status", "created_at"];
const MESSAGE_COLUMNS: &[&str] = &["quote_id", "author_role", "created_at"];

/// Inbox filters. Blank strings behave like absent ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboxFilters {
    /// Exact quote status.
    pub status: Option<String>,
    pub needs_action_only: bool,
    pub message_needs_reply_only: bool,
    pub intro_requested_only: bool,
    /// Keep quotes with at least one destination for this provider.
    pub provider_id: Option<String>,
    /// Keep quotes with at least one destination in this status.
    pub destination_status: Option<String>,
    /// Only quotes with a selected offer.
    pub selected_only: bool,
}

impl InboxFilters {
    fn normalized(&self) -> Self {
        Self {
            status: non_blank(self.status.as_deref()),
            provider_id: non_blank(self.provider_id.as_deref()),
            destination_status: non_blank(self.destination_status.as_deref()),
            ..self.clone()
        }
    }

    fn keeps(&self, row: &QuoteHealthRow) -> bool {
        if self.needs_action_only && row.summary.needs_action_count == 0 {
            return false;
        }
        if self.message_needs_reply_only && row.summary.message_needs_reply_count == 0 {
            return false;
        }
        if self.intro_requested_only && row.summary.intro_requests_count == 0 {
            return false;
        }
        if let Some(provider_id) = &self.provider_id {
            if !row
                .destinations
                .iter()
                .any(|d| &d.destination.provider_id == provider_id)
            {
                return false;
            }
        }
        if let Some(status) = &self.destination_status {
            let wanted = DestinationStatus::parse(status);
            if !row
                .destinations
                .iter()
                .any(|d| DestinationStatus::parse(&d.destination.status) == wanted)
            {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// One inbox page request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboxQuery {
    /// Page size; defaults to [`DEFAULT_LIMIT`], capped at [`MAX_LIMIT`].
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub filters: InboxFilters,
}

impl InboxQuery {
    /// Effective `(limit, offset)`, or `None` when the page is empty by
    /// construction.
    fn page(&self) -> Option<(i64, i64)> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = self.offset.unwrap_or(0);
        (limit > 0 && offset >= 0).then_some((limit, offset))
    }
}

/// A destination with its own verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationHealth {
    #[serde(flatten)]
    pub destination: DestinationRecord,
    pub needs_action: bool,
    pub reason: Option<NeedsActionReason>,
}

/// Health rollup for one quote. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuoteHealthSummary {
    /// Destinations per status.
    pub counts: BTreeMap<String, u32>,
    /// SLA verdicts plus one for an owed customer reply and one for pending intros.
    pub needs_action_count: u32,
    pub needs_reply_count: u32,
    pub errors_count: u32,
    pub queued_stale_count: u32,
    pub message_needs_reply_count: u32,
    pub intro_requests_count: u32,
    pub top_reasons: Vec<NeedsActionReason>,
    pub offers_count: u32,
    pub intro_provider_ids: Vec<String>,
    pub last_intro_requested_at: Option<DateTime<Utc>>,
    pub last_customer_message_at: Option<DateTime<Utc>>,
    pub last_staff_message_at: Option<DateTime<Utc>>,
}

/// One inbox row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteHealthRow {
    pub quote: QuoteRecord,
    pub destinations: Vec<DestinationHealth>,
    pub summary: QuoteHealthSummary,
}

/// Builds inbox pages.
///
/// Every sub-query is gated on the schema and degrades to an empty result on
/// its own, so a partially migrated database still yields a complete page.
#[derive(Clone)]
pub struct OpsInboxBuilder {
    database: Database,
    schema: Arc<dyn SchemaCapabilityProvider>,
    warnings: Arc<WarnOnce>,
    ledger: EventLedger,
    sla: SlaConfigProvider,
}

impl OpsInboxBuilder {
    pub fn new(database: Database, schema: Arc<dyn SchemaCapabilityProvider>) -> Self {
        let warnings = Arc::new(WarnOnce::new());
        Self {
            ledger: EventLedger::new(database.clone(), schema.clone(), warnings.clone()),
            sla: SlaConfigProvider::new(database.clone(), schema.clone(), warnings.clone()),
            database,
            schema,
            warnings,
        }
    }

    pub fn ledger(&self) -> &EventLedger {
        &self.ledger
    }

    pub fn sla_config(&self) -> &SlaConfigProvider {
        &self.sla
    }

    /// Build a page of rows, newest quote first.
    ///
    /// Without an explicit `sla`, the stored settings (or defaults) apply.
    pub async fn build(&self, query: &InboxQuery, sla: Option<SlaConfig>) -> Vec<QuoteHealthRow> {
        self.build_at(query, sla, Utc::now()).await
    }

    pub async fn build_at(
        &self,
        query: &InboxQuery,
        sla: Option<SlaConfig>,
        now: DateTime<Utc>,
    ) -> Vec<QuoteHealthRow> {
        let Some((limit, offset)) = query.page() else {
            return Vec::new();
        };
        let filters = query.filters.normalized();

        let quotes = self.load_quotes(limit, offset, &filters).await;
        if quotes.is_empty() {
            return Vec::new();
        }
        let quote_ids: Vec<String> = quotes.iter().map(|q| q.id.clone()).collect();

        let config = match sla {
            Some(config) => config,
            None => self.sla.load_config().await.config,
        };

        let (destinations, offers, replies, intros) = tokio::join!(
            self.load_destinations(&quote_ids),
            self.load_offers(&quote_ids),
            self.load_reply_rollups(&quote_ids),
            self.ledger.load_intro_requests(&quote_ids),
        );

        let mut destinations = group_by_quote(destinations, |d| &d.quote_id);
        let mut offers = group_by_quote(offers, |o| &o.quote_id);
        let mut replies: HashMap<String, MessageReplyRollup> = replies
            .into_iter()
            .map(|r| (r.quote_id.clone(), r))
            .collect();
        let mut intros = intros;

        let total = quotes.len();
        let rows: Vec<QuoteHealthRow> = quotes
            .into_iter()
            .map(|quote| {
                let id = quote.id.clone();
                hydrate(
                    quote,
                    destinations.remove(&id).unwrap_or_default(),
                    offers.remove(&id).unwrap_or_default(),
                    replies.remove(&id),
                    intros.remove(&id),
                    now,
                    &config,
                )
            })
            .filter(|row| filters.keeps(row))
            .collect();

        debug!(quotes = total, rows = rows.len(), limit, offset, "Built ops inbox page");
        rows
    }

    async fn gate(&self, relation: &str, columns: &[&str], operation: &str) -> bool {
        let present = self.schema.has_required_columns(relation, columns).await;
        if !present {
            self.warnings.missing_schema(relation, operation);
        }
        present
    }

    async fn load_quotes(&self, limit: i64, offset: i64, filters: &InboxFilters) -> Vec<QuoteRecord> {
        if !self.gate("quotes", QUOTE_COLUMNS, "list_quotes").await {
            return Vec::new();
        }
        let fields = QuoteFields::resolve(self.schema.as_ref()).await;
        let page = QuotePageQuery {
            limit,
            offset,
            status: filters.status.as_deref(),
            selected_only: filters.selected_only,
        };
        self.warnings.settle(
            "quotes",
            "list_quotes",
            quote::list_quotes(self.database.pool(), &page, fields).await,
        )
    }

    async fn load_destinations(&self, quote_ids: &[String]) -> Vec<DestinationRecord> {
        if !self
            .gate("destinations", DESTINATION_COLUMNS, "list_destinations")
            .await
        {
            return Vec::new();
        }
        let fields = DestinationFields::resolve(self.schema.as_ref()).await;
        self.warnings.settle(
            "destinations",
            "list_destinations",
            destination::list_for_quotes(self.database.pool(), quote_ids, fields).await,
        )
    }

    async fn load_offers(&self, quote_ids: &[String]) -> Vec<OfferRecord> {
        if !self.gate("offers", OFFER_COLUMNS, "list_offers").await {
            return Vec::new();
        }
        let fields = OfferFields::resolve(self.schema.as_ref()).await;
        self.warnings.settle(
            "offers",
            "list_offers",
            offer::list_for_quotes(self.database.pool(), quote_ids, fields).await,
        )
    }

    async fn load_reply_rollups(&self, quote_ids: &[String]) -> Vec<MessageReplyRollup> {
        if !self
            .gate("quote_messages", MESSAGE_COLUMNS, "list_reply_rollups")
            .await
        {
            return Vec::new();
        }
        self.warnings.settle(
            "quote_messages",
            "list_reply_rollups",
            message::list_reply_rollups(self.database.pool(), quote_ids).await,
        )
    }
}

fn group_by_quote<T>(items: Vec<T>, key: impl Fn(&T) -> &String) -> HashMap<String, Vec<T>> {
    let mut grouped: HashMap<String, Vec<T>> = HashMap::new();
    for item in items {
        grouped.entry(key(&item).clone()).or_default().push(item);
    }
    grouped
}

fn hydrate(
    quote: QuoteRecord,
    destinations: Vec<DestinationRecord>,
    offers: Vec<OfferRecord>,
    reply: Option<MessageReplyRollup>,
    intro: Option<IntroRequestState>,
    now: DateTime<Utc>,
    config: &SlaConfig,
) -> QuoteHealthRow {
    let snapshots: Vec<_> = destinations.iter().map(DestinationRecord::snapshot).collect();
    let offer_snapshots: Vec<_> = offers.iter().map(OfferRecord::snapshot).collect();
    let offer_providers: HashSet<&str> = offers.iter().map(|o| o.provider_id.as_str()).collect();

    let rollup = aggregate(&snapshots, &offer_snapshots, now, config);

    let destinations = destinations
        .into_iter()
        .zip(&snapshots)
        .map(|(destination, snapshot)| {
            let has_offer = offer_providers.contains(snapshot.provider_id.as_str());
            let verdict = evaluate(snapshot, now, config, has_offer);
            DestinationHealth {
                destination,
                needs_action: verdict.needs_action,
                reason: verdict.reason,
            }
        })
        .collect();

    let message_needs_reply_count = reply
        .as_ref()
        .map(|r| u32::try_from(r.unreplied_count.max(0)).unwrap_or(u32::MAX))
        .unwrap_or(0);
    let intro = intro.unwrap_or_default();

    let mut needs_action_count = rollup.needs_action_count;
    if reply.as_ref().is_some_and(MessageReplyRollup::needs_reply) {
        needs_action_count += 1;
    }
    if intro.intro_requests_count > 0 {
        needs_action_count += 1;
    }

    let summary = QuoteHealthSummary {
        counts: rollup.counts,
        needs_action_count,
        needs_reply_count: rollup.needs_reply_count,
        errors_count: rollup.errors_count,
        queued_stale_count: rollup.queued_stale_count,
        message_needs_reply_count,
        intro_requests_count: intro.intro_requests_count,
        top_reasons: rollup.top_reasons,
        offers_count: u32::try_from(offers.len()).unwrap_or(u32::MAX),
        intro_provider_ids: intro.provider_ids,
        last_intro_requested_at: intro.last_requested_at,
        last_customer_message_at: reply.as_ref().and_then(|r| r.last_customer_message_at),
        last_staff_message_at: reply.as_ref().and_then(|r| r.last_staff_message_at),
    };

    QuoteHealthRow {
        quote,
        destinations,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use database::destination::NewDestination;
    use database::message::AuthorRole;
    use database::quote::NewQuote;
    use ops_core::{OpsEventKind, StaticCapabilities};

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    async fn add_quote(db: &Database, id: &str, status: &str, selected: Option<&str>, hour: i64) {
        quote::create_quote(
            db.pool(),
            &NewQuote {
                id,
                status,
                selected_offer_id: selected,
                customer_name: Some("Ada"),
                customer_email: Some("ada@example.com"),
                created_at: at(hour),
            },
        )
        .await
        .unwrap();
    }

    /// q1: stale queued destination
    /// q2: answered by an offer, customer waiting on a reply
    /// q3: errored destination and a pending intro request
    /// q4: awarded, sent destination still inside its window
    async fn seeded() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        add_quote(&db, "q1", "open", None, 0).await;
        add_quote(&db, "q2", "open", None, 1).await;
        add_quote(&db, "q3", "open", None, 2).await;
        add_quote(&db, "q4", "awarded", Some("o4"), 3).await;

        destination::upsert_provider(db.pool(), "p1", "Acme Machining").await.unwrap();
        destination::create_destination(
            db.pool(),
            &NewDestination::new("d1", "q1", "p1", "queued", at(0)),
        )
        .await
        .unwrap();

        let mut d2 = NewDestination::new("d2", "q2", "p2", "sent", at(1));
        d2.sent_at = Some(at(1));
        destination::create_destination(db.pool(), &d2).await.unwrap();
        offer::create_offer(db.pool(), "o2", "q2", "p2", "received", Some(at(2)))
            .await
            .unwrap();
        message::insert_message(db.pool(), "q2", AuthorRole::Customer, "any update?", at(3))
            .await
            .unwrap();

        let mut d3 = NewDestination::new("d3", "q3", "p1", "error", at(2));
        d3.error_message = Some("mailbox full");
        destination::create_destination(db.pool(), &d3).await.unwrap();

        let mut d4 = NewDestination::new("d4", "q4", "p3", "sent", at(3));
        d4.sent_at = Some(at(3));
        destination::create_destination(db.pool(), &d4).await.unwrap();

        db
    }

    async fn builder(db: &Database) -> OpsInboxBuilder {
        let builder = OpsInboxBuilder::new(db.clone(), Arc::new(db.schema_inspector()));
        builder
            .ledger()
            .record_event(
                Some("q3"),
                None,
                &OpsEventKind::CustomerIntroRequested {
                    provider_id: "p9".to_string(),
                    note: None,
                },
                at(4),
            )
            .await;
        builder
    }

    fn ids(rows: &[QuoteHealthRow]) -> Vec<&str> {
        rows.iter().map(|r| r.quote.id.as_str()).collect()
    }

    fn filtered(filters: InboxFilters) -> InboxQuery {
        InboxQuery {
            filters,
            ..InboxQuery::default()
        }
    }

    #[tokio::test]
    async fn test_rows_newest_first_with_augmented_counts() {
        let db = seeded().await;
        let builder = builder(&db).await;

        let rows = builder.build_at(&InboxQuery::default(), None, at(10)).await;
        assert_eq!(ids(&rows), vec!["q4", "q3", "q2", "q1"]);

        let q4 = &rows[0].summary;
        assert_eq!(q4.needs_action_count, 0);

        let q3 = &rows[1].summary;
        assert_eq!(q3.errors_count, 1);
        assert_eq!(q3.intro_requests_count, 1);
        assert_eq!(q3.intro_provider_ids, vec!["p9".to_string()]);
        assert_eq!(q3.needs_action_count, 2);
        assert_eq!(q3.top_reasons, vec![NeedsActionReason::Error]);
        assert_eq!(rows[1].destinations[0].reason, Some(NeedsActionReason::Error));
        assert_eq!(
            rows[1].destinations[0].destination.provider_name.as_deref(),
            Some("Acme Machining")
        );

        let q2 = &rows[2].summary;
        assert_eq!(q2.offers_count, 1);
        assert_eq!(q2.needs_reply_count, 0);
        assert_eq!(q2.message_needs_reply_count, 1);
        assert_eq!(q2.needs_action_count, 1);
        assert_eq!(q2.last_customer_message_at, Some(at(3)));

        let q1 = &rows[3].summary;
        assert_eq!(q1.queued_stale_count, 1);
        assert_eq!(q1.needs_action_count, 1);
        assert_eq!(q1.counts.get("queued"), Some(&1));
    }

    #[tokio::test]
    async fn test_post_filters_preserve_order() {
        let db = seeded().await;
        let builder = builder(&db).await;

        let cases = [
            (
                InboxFilters {
                    needs_action_only: true,
                    ..Default::default()
                },
                vec!["q3", "q2", "q1"],
            ),
            (
                InboxFilters {
                    message_needs_reply_only: true,
                    ..Default::default()
                },
                vec!["q2"],
            ),
            (
                InboxFilters {
                    intro_requested_only: true,
                    ..Default::default()
                },
                vec!["q3"],
            ),
            (
                InboxFilters {
                    provider_id: Some("p1".to_string()),
                    ..Default::default()
                },
                vec!["q3", "q1"],
            ),
            (
                InboxFilters {
                    destination_status: Some("ERROR".to_string()),
                    ..Default::default()
                },
                vec!["q3"],
            ),
            (
                InboxFilters {
                    status: Some("awarded".to_string()),
                    ..Default::default()
                },
                vec!["q4"],
            ),
            (
                InboxFilters {
                    selected_only: true,
                    ..Default::default()
                },
                vec!["q4"],
            ),
            (
                InboxFilters {
                    status: Some("  ".to_string()),
                    provider_id: Some(String::new()),
                    ..Default::default()
                },
                vec!["q4", "q3", "q2", "q1"],
            ),
        ];

        for (filters, expected) in cases {
            let rows = builder.build_at(&filtered(filters.clone()), None, at(10)).await;
            assert_eq!(ids(&rows), expected, "filters: {filters:?}");
        }
    }

    #[tokio::test]
    async fn test_unknown_destination_status_filter_ignores_case() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        add_quote(&db, "q1", "open", None, 0).await;
        add_quote(&db, "q2", "open", None, 1).await;
        for (id, quote_id, status) in [
            ("d1", "q1", "on_hold"),
            ("d2", "q1", "On_Hold "),
            ("d3", "q2", "queued"),
        ] {
            let row = NewDestination::new(id, quote_id, "p1", status, at(0));
            destination::create_destination(db.pool(), &row).await.unwrap();
        }
        let builder = OpsInboxBuilder::new(db.clone(), Arc::new(db.schema_inspector()));

        let rows = builder
            .build_at(
                &filtered(InboxFilters {
                    destination_status: Some("ON_HOLD".to_string()),
                    ..Default::default()
                }),
                None,
                at(1),
            )
            .await;
        assert_eq!(ids(&rows), vec!["q1"]);
        assert_eq!(rows[0].summary.counts.get("on_hold"), Some(&2));
        assert_eq!(rows[0].summary.counts.len(), 1);
    }

    #[tokio::test]
    async fn test_paging() {
        let db = seeded().await;
        let builder = builder(&db).await;

        let page = |limit, offset| InboxQuery {
            limit,
            offset,
            ..InboxQuery::default()
        };

        let rows = builder.build_at(&page(Some(2), None), None, at(10)).await;
        assert_eq!(ids(&rows), vec!["q4", "q3"]);
        let rows = builder.build_at(&page(Some(2), Some(2)), None, at(10)).await;
        assert_eq!(ids(&rows), vec!["q2", "q1"]);
        let rows = builder.build_at(&page(Some(1_000), None), None, at(10)).await;
        assert_eq!(rows.len(), 4);

        assert!(builder.build_at(&page(Some(0), None), None, at(10)).await.is_empty());
        assert!(builder.build_at(&page(None, Some(-1)), None, at(10)).await.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_and_stored_sla_config() {
        let db = seeded().await;
        let builder = builder(&db).await;

        let relaxed = SlaConfig {
            queued_max_hours: 20,
            ..SlaConfig::default()
        };
        let rows = builder.build_at(&InboxQuery::default(), Some(relaxed), at(10)).await;
        assert_eq!(rows[3].summary.queued_stale_count, 0);

        // Stored settings apply when none are passed
        assert!(builder.sla_config().save_config(20.0, 48.0).await.is_saved());
        let rows = builder.build_at(&InboxQuery::default(), None, at(10)).await;
        assert_eq!(rows[3].summary.queued_stale_count, 0);

        // Four days on, q4's sent destination has gone quiet too
        let rows = builder.build_at(&InboxQuery::default(), None, at(96)).await;
        assert_eq!(rows[0].summary.needs_reply_count, 1);
        assert_eq!(rows[0].destinations[0].reason, Some(NeedsActionReason::NoReply));
    }

    #[tokio::test]
    async fn test_capability_table_hides_optional_relations() {
        let db = seeded().await;
        let caps = StaticCapabilities::new()
            .with_relation("quotes", QUOTE_COLUMNS)
            .with_relation("destinations", DESTINATION_COLUMNS)
            .with_relation("offers", OFFER_COLUMNS);
        let builder = OpsInboxBuilder::new(db.clone(), Arc::new(caps));

        let rows = builder.build_at(&InboxQuery::default(), None, at(10)).await;
        assert_eq!(ids(&rows), vec!["q4", "q3", "q2", "q1"]);

        // No messages, no intros, no customer columns, no provider names
        let q2 = &rows[2];
        assert_eq!(q2.summary.message_needs_reply_count, 0);
        assert_eq!(q2.summary.needs_action_count, 0);
        assert_eq!(q2.quote.customer_name, None);
        assert_eq!(rows[3].destinations[0].destination.provider_name, None);
        assert_eq!(rows[1].summary.intro_requests_count, 0);
    }

    #[tokio::test]
    async fn test_partial_schema_degrades() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        for statement in [
            "CREATE TABLE quotes (id TEXT PRIMARY KEY, status TEXT NOT NULL, selected_offer_id TEXT, created_at TEXT NOT NULL)",
            "CREATE TABLE destinations (id TEXT PRIMARY KEY, quote_id TEXT NOT NULL, provider_id TEXT NOT NULL, status TEXT NOT NULL, created_at TEXT NOT NULL)",
            "INSERT INTO quotes VALUES ('q1', 'open', NULL, '2025-01-01T00:00:00.000Z')",
            "INSERT INTO destinations VALUES ('d1', 'q1', 'p1', 'sent', '2025-01-01T00:00:00.000Z')",
        ] {
            sqlx::query(statement).execute(db.pool()).await.unwrap();
        }
        let builder = OpsInboxBuilder::new(db.clone(), Arc::new(db.schema_inspector()));

        let rows = builder.build_at(&InboxQuery::default(), None, at(72)).await;
        assert_eq!(rows.len(), 1);
        let summary = &rows[0].summary;
        // Reply clock falls back to created_at; defaults apply without settings
        assert_eq!(summary.needs_reply_count, 1);
        assert_eq!(summary.offers_count, 0);
        assert_eq!(summary.intro_requests_count, 0);
        assert_eq!(rows[0].destinations[0].destination.sent_at, None);
    }

    #[tokio::test]
    async fn test_missing_quotes_relation_is_empty() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let builder = OpsInboxBuilder::new(db.clone(), Arc::new(db.schema_inspector()));
        assert!(builder.build(&InboxQuery::default(), None).await.is_empty());
    }
}
