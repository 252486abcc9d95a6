use ticket_cluster::{ClusteringConfig, Ticket, TicketClusterer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Minimal end-to-end: raw ticket text -> topics with top terms and samples.
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));

    let tickets = vec![
        Ticket::new("T1", "Cannot reset my password, the link expired"),
        Ticket::new("T2", "Password reset email never arrives"),
        Ticket::new("T3", "Locked out after too many password attempts"),
        Ticket::new("T4", "Invoice payment failed with card declined"),
        Ticket::new("T5", "Payment did not go through for the March invoice"),
        Ticket::new("T6", "Charged twice, need a refund for the duplicate payment"),
        Ticket::new("T7", "VPN disconnects every few minutes"),
        Ticket::new("T8", "Cannot connect to the VPN from home"),
        Ticket::new("T9", "VPN client crashes when connecting"),
    ];

    let config = ClusteringConfig::default().with_k_range(2, 5).with_top_n(4);
    let report = TicketClusterer::new(config).run(&tickets)?;

    println!(
        "k={} silhouette={:.3} features={}",
        report.diagnostics.chosen_k, report.diagnostics.silhouette, report.diagnostics.n_features
    );
    for cluster in &report.clusters {
        let terms: Vec<&str> = cluster.top_terms.iter().map(|t| t.label.as_str()).collect();
        println!(
            "  cluster {} ({} tickets, {:.0}%): {}",
            cluster.cluster_index,
            cluster.size,
            cluster.share * 100.0,
            terms.join(", ")
        );
        for id in &cluster.sample_ticket_ids {
            if let Some(t) = tickets.iter().find(|t| &t.id == id) {
                println!("    {}: {}", t.id, t.text);
            }
        }
    }

    Ok(())
}
