// src/services/views.rs
//! Pure builders from catalog data to serialisable view descriptions.
//! The client turns a description into markup; nothing is cached between calls.

use serde::Serialize;

use super::catalog::{
    AdAccount, Catalog, Chart, ChartSeries, ConfirmerService, HireRequest, HireStatus, Transaction, User,
};
use super::session_store::Role;
use super::view_router::ViewId;

/// The confirmer whose inbox the confirmer dashboard shows.
pub const CURRENT_CONFIRMER_ID: u32 = 2;

const COMING_SOON: &str = "سيتم إضافة هذه الميزة قريباً.";
const NO_REQUESTS: &str = "لا توجد طلبات توظيف حالياً.";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewDescription {
    pub view: ViewId,
    pub title: String,
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stat {
    pub label: &'static str,
    pub value: String,
    pub icon: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Green,
    Red,
    Yellow,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HireRequestCard {
    pub request: HireRequest,
    pub status_label: &'static str,
    pub tone: Tone,
    /// Pending requests offer accept/decline actions.
    pub actionable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConfirmerCard {
    pub confirmer_name: String,
    pub avatar: String,
    pub experience_label: String,
    pub price_label: String,
    pub regions_label: String,
    pub service: ConfirmerService,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Intro { text: &'static str },
    Stats { items: Vec<Stat> },
    Chart { title: &'static str, chart: Chart },
    HireRequests { title: &'static str, cards: Vec<HireRequestCard>, empty_text: &'static str },
    Confirmers { cards: Vec<ConfirmerCard> },
    AdAccounts { accounts: Vec<AdAccount> },
    Wallet { balance: String, transactions: Vec<Transaction> },
    Users { users: Vec<User> },
    Placeholder { text: &'static str },
}

/// Format an amount in Algerian dinars with thousands separators.
pub fn format_dzd(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{} دج", sign, grouped)
}

fn stat(label: &'static str, value: impl Into<String>, icon: &'static str) -> Stat {
    Stat { label, value: value.into(), icon }
}

fn placeholder(view: ViewId, title: &str) -> ViewDescription {
    ViewDescription { view, title: title.to_string(), blocks: vec![Block::Placeholder { text: COMING_SOON }] }
}

/// Build the whole content region for `view` as seen by `role`.
pub fn render(view: ViewId, role: Role, catalog: &Catalog) -> ViewDescription {
    match (view, role) {
        (ViewId::Dashboard, Role::Marketer) => marketer_dashboard(catalog),
        (ViewId::Dashboard, Role::Confirmer) => confirmer_dashboard(catalog),
        (ViewId::Dashboard, Role::Admin) => admin_dashboard(catalog),
        (ViewId::Confirmers, _) => confirmer_community(catalog),
        (ViewId::Accounts, _) => ad_account_store(catalog),
        (ViewId::Services, _) => placeholder(view, "خدمات المحتوى"),
        (ViewId::Wallet, _) => wallet(catalog),
        (ViewId::Users, _) => user_management(catalog),
        (ViewId::Settings, Role::Admin) => placeholder(view, "إعدادات الموقع"),
        (ViewId::Settings, _) => placeholder(view, "إعدادات الحساب"),
    }
}

pub fn marketer_dashboard(catalog: &Catalog) -> ViewDescription {
    let confirmers = catalog.users.iter().filter(|u| u.role == Role::Confirmer).count();
    let spend: u32 = catalog
        .campaign_chart
        .series
        .iter()
        .find(|s| s.label == "تكلفة")
        .map(|s| s.data.iter().sum())
        .unwrap_or_default();
    ViewDescription {
        view: ViewId::Dashboard,
        title: "لوحة تحكم المسوق".into(),
        blocks: vec![
            Block::Stats {
                items: vec![
                    stat("الرصيد الحالي", format_dzd(45_750), "wallet"),
                    stat("الحملات النشطة", "3", "megaphone"),
                    stat("المؤكدين المتاحين", confirmers.to_string(), "users"),
                    stat("إجمالي الإنفاق", format_dzd(i64::from(spend)), "credit-card"),
                ],
            },
            Block::Chart { title: "نتائج الحملات", chart: catalog.campaign_chart.clone() },
        ],
    }
}

fn status_chip(status: HireStatus) -> (&'static str, Tone) {
    match status {
        HireStatus::Pending => ("طلب جديد", Tone::Yellow),
        HireStatus::Accepted => ("مقبول", Tone::Green),
        HireStatus::Declined => ("مرفوض", Tone::Red),
    }
}

pub fn confirmer_dashboard(catalog: &Catalog) -> ViewDescription {
    let cards = catalog
        .requests_for(CURRENT_CONFIRMER_ID)
        .into_iter()
        .map(|request| {
            let (status_label, tone) = status_chip(request.status);
            HireRequestCard {
                request: request.clone(),
                status_label,
                tone,
                actionable: request.status == HireStatus::Pending,
            }
        })
        .collect();
    ViewDescription {
        view: ViewId::Dashboard,
        title: "لوحة تحكم المؤكد".into(),
        blocks: vec![
            Block::Stats {
                items: vec![
                    stat("الأرباح الشهرية", format_dzd(32_500), "dollar-sign"),
                    stat("نسبة القبول", "85%", "check-circle"),
                    stat("العملاء الحاليين", "4", "users"),
                    stat("متوسط الرد", "3 ساعات", "clock"),
                ],
            },
            Block::HireRequests { title: "طلبات التوظيف الواردة", cards, empty_text: NO_REQUESTS },
        ],
    }
}

pub fn confirmer_community(catalog: &Catalog) -> ViewDescription {
    let cards = catalog
        .services
        .iter()
        .filter_map(|service| {
            let confirmer = catalog.user(service.confirmer_id)?;
            Some(ConfirmerCard {
                confirmer_name: confirmer.name.clone(),
                avatar: confirmer.avatar.clone(),
                experience_label: format!("{} سنوات", service.experience),
                price_label: format!("{} دج / طلب", service.price_per_order),
                regions_label: service.regions.join(", "),
                service: service.clone(),
            })
        })
        .collect();
    ViewDescription {
        view: ViewId::Confirmers,
        title: "مجتمع المؤكدين".into(),
        blocks: vec![
            Block::Intro { text: "تصفح عروض الخدمات من المؤكدين المحترفين في مجتمعنا واختر الأنسب لحملاتك." },
            Block::Confirmers { cards },
        ],
    }
}

pub fn ad_account_store(catalog: &Catalog) -> ViewDescription {
    ViewDescription {
        view: ViewId::Accounts,
        title: "متجر الحسابات الإعلانية".into(),
        blocks: vec![Block::AdAccounts { accounts: catalog.ad_accounts.clone() }],
    }
}

pub fn wallet(catalog: &Catalog) -> ViewDescription {
    ViewDescription {
        view: ViewId::Wallet,
        title: "المحفظة".into(),
        blocks: vec![Block::Wallet {
            balance: format_dzd(catalog.balance()),
            transactions: catalog.transactions.clone(),
        }],
    }
}

pub fn admin_dashboard(catalog: &Catalog) -> ViewDescription {
    let count = |role: Role| catalog.users.iter().filter(|u| u.role == role).count().to_string();
    let growth = Chart {
        kind: "line".into(),
        labels: ["يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو"].iter().map(|s| s.to_string()).collect(),
        series: vec![ChartSeries { label: "مستخدمين جدد".into(), data: vec![12, 19, 30, 45, 62, 80], color: "#3b82f6".into() }],
    };
    ViewDescription {
        view: ViewId::Dashboard,
        title: "لوحة تحكم الأدمن".into(),
        blocks: vec![
            Block::Stats {
                items: vec![
                    stat("إجمالي المستخدمين", catalog.users.len().to_string(), "users"),
                    stat("المسوقين", count(Role::Marketer), "megaphone"),
                    stat("المؤكدين", count(Role::Confirmer), "phone"),
                    stat("طلبات التوظيف", catalog.hire_requests.len().to_string(), "briefcase"),
                ],
            },
            Block::Chart { title: "نمو المستخدمين", chart: growth },
        ],
    }
}

pub fn user_management(catalog: &Catalog) -> ViewDescription {
    ViewDescription {
        view: ViewId::Users,
        title: "إدارة المستخدمين".into(),
        blocks: vec![Block::Users { users: catalog.users.clone() }],
    }
}
