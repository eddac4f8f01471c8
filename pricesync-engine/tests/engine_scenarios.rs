use pricesync_core::{Document, MemoryDocument, NodeSpec, PageLocation};
use pricesync_engine::runtime::snapshot;
use pricesync_engine::{ConfigRegistry, EngineError, PageEngine, PriceSyncEngine, RenderSink};
use pricesync_shared::{BlockConfig, RenderTrigger, VariantId, VariantPriceRecord};
use pricesync_store::EngineSettings;

const MIRROR: &str = "gd-b2b-price-update";

fn mirror() -> NodeSpec {
    NodeSpec::element("span").with_class(MIRROR)
}

fn product_page(block_ids: &[&str]) -> MemoryDocument {
    let mut specs: Vec<NodeSpec> = block_ids
        .iter()
        .map(|id| NodeSpec::element("div").with_id(format!("b2b-price-container-{}", id)))
        .collect();
    specs.push(NodeSpec::element("div").with_class("sticky-cart").with_child(mirror()));
    MemoryDocument::from_specs(&specs)
}

fn location(href: &str) -> PageLocation {
    PageLocation::parse(href).unwrap()
}

fn tee_config() -> BlockConfig {
    BlockConfig::new("main", false)
        .with_money_format("${{amount}}")
        .with_variant("1", VariantPriceRecord::new(2500))
        .with_variant("2", VariantPriceRecord::new(2000).with_compare_at(2500))
        .with_selected("1")
}

fn engine_with(config: BlockConfig, settings: EngineSettings) -> PageEngine {
    let mut engine = PriceSyncEngine::new(
        settings,
        product_page(&["main"]),
        location("https://shop.example/products/tee"),
    );
    engine.register(config).unwrap();
    engine
}

fn primary_html(engine: &PageEngine, block_id: &str) -> String {
    let doc = engine.document();
    let node = doc.element_by_id(&format!("b2b-price-container-{}", block_id)).unwrap();
    doc.inner_html(node)
}

fn mirror_htmls(engine: &PageEngine) -> Vec<String> {
    let doc = engine.document();
    doc.elements_by_class(MIRROR).into_iter().map(|n| doc.inner_html(n)).collect()
}

#[test]
fn render_twice_is_same_as_once() {
    let mut engine = engine_with(tee_config(), EngineSettings::default());
    let instance = engine.instances()[0].clone();
    let sink = RenderSink::new(engine.settings());

    let once = snapshot(&engine);
    sink.render(engine.document_mut(), &instance);
    sink.render(engine.document_mut(), &instance);
    assert_eq!(snapshot(&engine), once);
}

#[test]
fn late_registration_matches_pre_seeded() {
    let settings = EngineSettings::default();

    let mut registry = ConfigRegistry::new(&settings);
    registry.register(tee_config()).unwrap();
    let seeded = PriceSyncEngine::start(
        settings.clone(),
        registry,
        product_page(&["main"]),
        location("https://shop.example/products/tee"),
    );

    let late = engine_with(tee_config(), settings);

    assert_eq!(snapshot(&seeded), snapshot(&late));
    assert_eq!(seeded.instances().len(), 1);
    assert_eq!(late.registry().len(), 1);
}

#[test]
fn blocks_keep_independent_state() {
    let mut engine = PriceSyncEngine::new(
        EngineSettings::default(),
        product_page(&["a", "b"]),
        location("https://shop.example/products/tee"),
    );
    engine.register(tee_config_for("a", &[("1", 1000), ("2", 1500)], "1")).unwrap();
    engine.register(tee_config_for("b", &[("10", 9900), ("20", 9950)], "10")).unwrap();
    let b_before = engine.instance("b").unwrap().current_html().to_string();

    engine.location_mut().set_query_param("variant", "2");
    assert_eq!(engine.poll(), 2);

    let a = engine.instance("a").unwrap();
    let b = engine.instance("b").unwrap();
    assert!(a.current_html().contains("$15.00"));
    assert_eq!(a.current_variant_id(), Some(&VariantId::from("2")));
    // b follows the shared address but has no data for it, so keeps its price
    assert_eq!(b.current_variant_id(), Some(&VariantId::from("2")));
    assert_eq!(b.current_html(), b_before);
    assert!(primary_html(&engine, "b").contains("$99.00"));
    assert!(!primary_html(&engine, "b").contains("$15.00"));
}

fn tee_config_for(block_id: &str, variants: &[(&str, i64)], selected: &str) -> BlockConfig {
    variants
        .iter()
        .fold(BlockConfig::new(block_id, false), |config, (id, price)| {
            config.with_variant(*id, VariantPriceRecord::new(*price))
        })
        .with_selected(selected)
}

#[test]
fn mirror_inserted_before_poll_shows_previous_price() {
    let mut engine = engine_with(tee_config(), EngineSettings::default());
    let first_html = engine.instances()[0].current_html().to_string();

    // Address changes, timer has not fired yet
    engine.location_mut().set_query_param("variant", "2");
    engine.document_mut().append_to_body(&mirror());
    engine.process_mutations();
    assert_eq!(mirror_htmls(&engine), vec![first_html.clone(), first_html.clone()]);

    // Poll refreshes the primary region only
    engine.poll();
    assert!(primary_html(&engine, "main").contains("b2b-regular-sale"));
    assert_eq!(mirror_htmls(&engine), vec![first_html.clone(), first_html.clone()]);

    // Mirrors inserted after the poll get the new fragment
    engine.document_mut().append_to_body(&mirror());
    engine.process_mutations();
    let mirrors = mirror_htmls(&engine);
    assert_eq!(mirrors[2], engine.instances()[0].current_html());
    assert_ne!(mirrors[2], first_html);
}

#[test]
fn refresh_mirrors_on_poll_closes_the_gap() {
    let settings = EngineSettings {
        refresh_mirrors_on_poll: true,
        ..EngineSettings::default()
    };
    let mut engine = engine_with(tee_config(), settings);

    engine.location_mut().set_query_param("variant", "2");
    engine.poll();
    let current = engine.instances()[0].current_html().to_string();
    assert!(mirror_htmls(&engine).iter().all(|html| *html == current));
}

#[test]
fn b2b_customer_sees_negotiated_price() {
    let config = BlockConfig::new("main", true)
        .with_variant("1", VariantPriceRecord::new(2500).with_compare_at(3000).with_b2b(1800))
        .with_selected("1");
    let engine = engine_with(config, EngineSettings::default());

    let html = primary_html(&engine, "main");
    assert!(html.contains("b2b-customer-price"));
    assert!(html.contains(r#"<span class="b2b-price-current">$18.00</span>"#));
    assert!(html.contains("$25.00"));
    assert!(!html.contains("$30.00"));
}

#[test]
fn unknown_variant_in_address_keeps_last_price() {
    let mut engine = engine_with(tee_config(), EngineSettings::default());
    let before = primary_html(&engine, "main");

    engine.location_mut().set_query_param("variant", "999");
    assert_eq!(engine.poll(), 1);
    assert_eq!(engine.instances()[0].current_variant_id(), Some(&VariantId::from("999")));
    assert_eq!(primary_html(&engine, "main"), before);

    // Unchanged address is a no-op
    assert_eq!(engine.poll(), 0);

    engine.location_mut().set_query_param("variant", "1");
    assert_eq!(engine.poll(), 1);
    assert_eq!(primary_html(&engine, "main"), before);
}

#[test]
fn empty_variant_param_is_ignored() {
    let mut engine = engine_with(tee_config(), EngineSettings::default());
    engine.location_mut().set_query_param("variant", "");
    assert_eq!(engine.poll(), 0);
    assert_eq!(engine.instances()[0].current_variant_id(), Some(&VariantId::from("1")));
}

#[test]
fn backfill_rules_for_inserted_subtrees() {
    let mut engine = engine_with(tee_config(), EngineSettings::default());
    let html = engine.instances()[0].current_html().to_string();

    // A mirror nested in a mirror: only the outer one is written
    let outer = engine
        .document_mut()
        .append_to_body(&mirror().with_id("outer").with_child(mirror().with_id("inner")));
    // A plain wrapper: every mirror below it is written
    let wrapper = engine.document_mut().append_to_body(
        &NodeSpec::element("section")
            .with_child(mirror().with_id("w1"))
            .with_child(NodeSpec::element("p").with_child(mirror().with_id("w2"))),
    );
    engine.document_mut().append_to_body(&NodeSpec::text("free shipping"));

    assert_eq!(engine.process_mutations(), 3);

    let doc = engine.document();
    assert_eq!(doc.inner_html(outer), html);
    assert!(doc.element_by_id("inner").is_none());
    assert_eq!(doc.descendants_by_class(wrapper, MIRROR).len(), 2);
    for id in ["w1", "w2"] {
        assert_eq!(doc.inner_html(doc.element_by_id(id).unwrap()), html);
    }
}

#[test]
fn new_instance_does_not_see_earlier_mutations() {
    let mut engine = PriceSyncEngine::new(
        EngineSettings::default(),
        product_page(&["a", "b"]),
        location("https://shop.example/products/tee"),
    );
    engine.register(tee_config_for("a", &[("1", 1000)], "1")).unwrap();
    let mut events = engine.subscribe();

    engine.document_mut().append_to_body(&mirror());
    engine.register(tee_config_for("b", &[("1", 2000)], "1")).unwrap();
    assert_eq!(engine.process_mutations(), 0);

    let first = events.try_recv().unwrap();
    assert_eq!((first.block_id.as_str(), first.trigger), ("a", RenderTrigger::Mutation));
    let second = events.try_recv().unwrap();
    assert_eq!((second.block_id.as_str(), second.trigger), ("b", RenderTrigger::Initial));
    assert!(events.try_recv().is_err());

    // b's initial render wrote every mirror last
    assert!(mirror_htmls(&engine).iter().all(|html| html.contains("$20.00")));
}

#[test]
fn rejected_config_creates_no_instance() {
    let mut engine = PriceSyncEngine::new(
        EngineSettings::default(),
        product_page(&["main"]),
        location("https://shop.example/products/tee"),
    );
    let result = engine.register(tee_config().with_money_format("price: amount"));
    assert!(matches!(result, Err(EngineError::Registry(_))));
    assert!(engine.instances().is_empty());
    assert!(engine.registry().is_empty());
    assert_eq!(primary_html(&engine, "main"), "");
}

#[test]
fn missing_primary_region_still_updates_mirrors() {
    let config = BlockConfig::new("elsewhere", false)
        .with_variant("1", VariantPriceRecord::new(500))
        .with_selected("1");
    let engine = engine_with(config, EngineSettings::default());
    assert!(mirror_htmls(&engine)[0].contains("$5.00"));
}
