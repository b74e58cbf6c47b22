//! File-backed stores: data survives reopening

use sales_agent_config::{PersistenceBackend, PersistenceConfig};
use sales_agent_core::{
    Deal, DealId, DealStore, Icp, Interaction, InteractionStore, InteractionType, NumericRange,
    PipelineStage,
};
use sales_agent_persistence::{init, IcpFileStore, JsonFileDealStore};

#[test]
fn test_deals_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = JsonFileDealStore::open(dir.path()).unwrap();
        let deal = Deal::new(DealId::from("DEAL-9"), "CUST-9", "Northwind", 42_000.0).unwrap();
        store.insert(deal.clone()).unwrap();

        // A deal as the stage machine leaves it after one move
        let mut moved = serde_json::to_value(&deal).unwrap();
        moved["stage"] = serde_json::json!("QUALIFICATION");
        moved["history"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({"stage": "QUALIFICATION", "entered_at": chrono::Utc::now(), "note": "booked"}));
        store.update(serde_json::from_value(moved).unwrap()).unwrap();
    }

    let reopened = JsonFileDealStore::open(dir.path()).unwrap();
    let deal = reopened.get(&DealId::from("DEAL-9")).unwrap().unwrap();
    assert_eq!(deal.stage(), PipelineStage::Qualification);
    assert_eq!(deal.history().len(), 2);
    assert_eq!(deal.value, 42_000.0);
    assert_eq!(reopened.list().unwrap().len(), 1);
}

#[test]
fn test_icp_round_trip_and_listing() {
    let dir = tempfile::tempdir().unwrap();
    let store = IcpFileStore::open(dir.path()).unwrap();

    let icp = Icp {
        industry: Some("B2B SaaS".into()),
        size: Some(NumericRange { min: 50.0, max: 200.0 }),
        persona_titles: vec!["VP Sales".into()],
        ..Default::default()
    };
    store.save("saas-mid-market", &icp).unwrap();
    store.save("fintech", &Icp::default()).unwrap();

    assert_eq!(store.load("saas-mid-market").unwrap(), Some(icp));
    assert_eq!(store.load("unknown").unwrap(), None);
    assert_eq!(store.list().unwrap(), vec!["fintech", "saas-mid-market"]);

    assert!(store.delete("fintech").unwrap());
    assert_eq!(store.list().unwrap(), vec!["saas-mid-market"]);
}

#[test]
fn test_init_selects_backend() {
    let dir = tempfile::tempdir().unwrap();

    let memory = init(&PersistenceConfig::default()).unwrap();
    assert!(memory.icps.is_none());
    assert!(memory.interactions.is_none());

    let json = init(&PersistenceConfig {
        backend: PersistenceBackend::Json,
        data_dir: dir.path().to_path_buf(),
    })
    .unwrap();
    assert!(json.icps.is_some());
    let interactions = json.interactions.as_ref().unwrap();
    interactions
        .append(&Interaction::new("C", InteractionType::Note, "kickoff"))
        .unwrap();
    assert!(dir.path().join("interactions.jsonl").exists());
    assert_eq!(interactions.load_all().unwrap().len(), 1);
    json.deals
        .insert(Deal::new(DealId::from("DEAL-1"), "C", "Acme", 1.0).unwrap())
        .unwrap();
    assert!(dir.path().join("deals.json").exists());
}
