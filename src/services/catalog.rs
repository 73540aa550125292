// src/services/catalog.rs
//! Static marketplace data the dashboard views are built from.

use serde::Serialize;

use super::session_store::Role;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConfirmerService {
    pub confirmer_id: u32,
    pub title: String,
    pub description: String,
    pub price_per_order: u32,
    pub experience: u32,
    pub regions: Vec<String>,
    pub specialties: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HireStatus {
    Pending,
    Accepted,
    Declined,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarketerRef {
    pub id: u32,
    pub name: String,
    pub avatar: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HireRequest {
    pub id: String,
    pub marketer: MarketerRef,
    pub confirmer_id: u32,
    pub message: String,
    pub status: HireStatus,
    pub date: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdAccount {
    pub id: u32,
    pub platform: String,
    pub payment_method: String,
    pub price: u32,
    pub is_verified: bool,
    pub stock: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Fee,
    Withdrawal,
    Reward,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub description: String,
    pub amount: i64,
    pub kind: TransactionKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub data: Vec<u32>,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Chart {
    pub kind: String,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    pub users: Vec<User>,
    pub services: Vec<ConfirmerService>,
    pub hire_requests: Vec<HireRequest>,
    pub ad_accounts: Vec<AdAccount>,
    pub transactions: Vec<Transaction>,
    pub campaign_chart: Chart,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::demo()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn avatar(seed: &str) -> String {
    format!("https://picsum.photos/seed/{}/100", seed)
}

impl Catalog {
    pub fn demo() -> Self {
        let user = |id, name: &str, email: &str, role, seed: &str| User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
            avatar: avatar(seed),
        };
        let users = vec![
            user(1, "أحمد بن علي", "ahmed@confirmer.com", Role::Confirmer, "ahmed"),
            user(2, "فاطمة الزهراء", "fatima@confirmer.com", Role::Confirmer, "fatima"),
            user(101, "علي المسوق", "ali@marketer.com", Role::Marketer, "ali"),
            user(102, "سارة المسوقة", "sara@marketer.com", Role::Marketer, "sara"),
        ];

        let services = vec![
            ConfirmerService {
                confirmer_id: 1,
                title: "خبير تأكيد طلبات - 3 سنوات خبرة".into(),
                description: "متخصص في منتجات التجميل والصحة، نسبة تأكيد عالية وتعامل احترافي مع الزبائن في العاصمة وضواحيها.".into(),
                price_per_order: 250,
                experience: 3,
                regions: strings(&["الجزائر العاصمة", "البليدة"]),
                specialties: strings(&["تجميل", "مكملات غذائية"]),
            },
            ConfirmerService {
                confirmer_id: 2,
                title: "تأكيد احترافي لولايات الغرب".into(),
                description: "5 سنوات خبرة في مجال التجارة الإلكترونية، أضمن لكم أفضل نسبة تأكيد في وهران، تلمسان، ومستغانم.".into(),
                price_per_order: 300,
                experience: 5,
                regions: strings(&["وهران", "تلمسان", "مستغانم"]),
                specialties: strings(&["أزياء", "إلكترونيات"]),
            },
        ];

        let ali = MarketerRef { id: 101, name: "علي المسوق".into(), avatar: avatar("ali") };
        let sara = MarketerRef { id: 102, name: "سارة المسوقة".into(), avatar: avatar("sara") };
        let hire = |id: &str, marketer: &MarketerRef, confirmer_id, message: &str, status, date: &str| HireRequest {
            id: id.to_string(),
            marketer: marketer.clone(),
            confirmer_id,
            message: message.to_string(),
            status,
            date: date.to_string(),
        };
        let hire_requests = vec![
            hire("HR001", &ali, 2, "مرحبا، لدي حملة جديدة لمنتجات ملابس وأحتاج مؤكد محترف في وهران.", HireStatus::Pending, "2024-07-25"),
            hire("HR002", &sara, 2, "السلام عليكم، هل أنت متاحة لتأكيد طلبات أجهزة إلكترونية؟", HireStatus::Accepted, "2024-07-24"),
            hire("HR003", &ali, 1, "أبحث عن مؤكد لمنتجات تجميل في العاصمة.", HireStatus::Pending, "2024-07-25"),
            hire("HR004", &sara, 1, "طلب توظيف لحملة مكملات غذائية جديدة.", HireStatus::Declined, "2024-07-23"),
        ];

        let account = |id, platform: &str, payment_method: &str, price, is_verified, stock| AdAccount {
            id,
            platform: platform.to_string(),
            payment_method: payment_method.to_string(),
            price,
            is_verified,
            stock,
        };
        let ad_accounts = vec![
            account(1, "Facebook", "Prepaid", 5000, true, 5),
            account(2, "TikTok", "Postpaid", 7500, true, 3),
            account(3, "Google", "Prepaid", 10000, false, 8),
            account(4, "Facebook", "Postpaid", 6000, true, 0),
        ];

        let txn = |id: &str, date: &str, description: &str, amount, kind| Transaction {
            id: id.to_string(),
            date: date.to_string(),
            description: description.to_string(),
            amount,
            kind,
        };
        let transactions = vec![
            txn("TXN12345", "2024-07-20", "إيداع عبر USDT", 5000, TransactionKind::Deposit),
            txn("TXN12346", "2024-07-19", "رسوم خدمة تأكيد", -250, TransactionKind::Fee),
            txn("TXN12347", "2024-07-18", "سحب أرباح CCP", -15000, TransactionKind::Withdrawal),
            txn("TXN12348", "2024-07-17", "مكافأة إحالة", 500, TransactionKind::Reward),
            txn("TXN12349", "2024-07-16", "إيداع BaridiMob", 20000, TransactionKind::Deposit),
        ];

        let campaign_chart = Chart {
            kind: "bar".into(),
            labels: strings(&["حملة 1", "حملة 2", "حملة 3", "حملة 4", "حملة 5"]),
            series: vec![
                ChartSeries { label: "نتائج".into(), data: vec![2400, 1398, 9800, 3908, 4800], color: "#3b82f6".into() },
                ChartSeries { label: "تكلفة".into(), data: vec![4000, 3000, 2000, 2780, 1890], color: "#4b5563".into() },
            ],
        };

        Self { users, services, hire_requests, ad_accounts, transactions, campaign_chart }
    }

    pub fn user(&self, id: u32) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn service_for(&self, confirmer_id: u32) -> Option<&ConfirmerService> {
        self.services.iter().find(|s| s.confirmer_id == confirmer_id)
    }

    pub fn requests_for(&self, confirmer_id: u32) -> Vec<&HireRequest> {
        self.hire_requests.iter().filter(|r| r.confirmer_id == confirmer_id).collect()
    }

    pub fn balance(&self) -> i64 {
        self.transactions.iter().map(|t| t.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_service_has_a_confirmer() {
        let catalog = Catalog::demo();
        for service in &catalog.services {
            let user = catalog.user(service.confirmer_id).unwrap();
            assert_eq!(user.role, Role::Confirmer);
        }
    }

    #[test]
    fn requests_are_filtered_by_confirmer() {
        let catalog = Catalog::demo();
        let ids: Vec<_> = catalog.requests_for(2).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["HR001", "HR002"]);
        assert_eq!(catalog.balance(), 10250);
    }
}
