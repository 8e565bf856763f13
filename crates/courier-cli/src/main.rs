use std::io::{self, BufRead, Write};

use color_eyre::eyre::{Context, Result};
use courier_worker::{
    CourierConfig, CourierWorker, Direction, MessageRecord, SendMessageRequest, WebhookUrlRequest,
    WorkerError, WorkerEvent,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .from_env_lossy()
                .add_directive("courier_cli=info".parse()?)
                .add_directive("courier_worker=warn".parse()?)
                .add_directive("courier_gateway=warn".parse()?)
                .add_directive("courier_db=warn".parse()?),
        )
        .init();

    let config = CourierConfig::from_env().wrap_err("Failed to read configuration")?;
    println!("🌐 Gateway: {}", config.gateway.base_url);

    let mut worker = CourierWorker::new(&config).wrap_err("Failed to create worker")?;
    println!("📁 Message log: {}", worker.store().path().display());

    let mut event_rx = worker
        .take_event_receiver()
        .ok_or_else(|| color_eyre::eyre::eyre!("Failed to get event receiver"))?;

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            handle_event(event);
        }
    });

    loop {
        print_menu();
        let Some(choice) = read_line("Choice: ")? else {
            println!("\n👋 Bye");
            break;
        };

        let outcome = match choice.trim() {
            "1" => send_message(&worker).await,
            "2" => list_messages(&worker).await,
            "3" => check_webhook(&worker).await,
            "4" => set_webhook(&worker).await,
            "5" => diagnostics(&worker).await,
            "0" => {
                println!("👋 Bye");
                break;
            }
            _ => {
                println!("❌ Invalid choice");
                Ok(())
            }
        };

        if let Err(e) = outcome {
            print_error(&e);
        }
    }

    Ok(())
}

fn print_menu() {
    println!();
    println!("╔════════════════════════════════════╗");
    println!("║     COURIER - WhatsApp Relay       ║");
    println!("╠════════════════════════════════════╣");
    println!("║  1. Send Message                   ║");
    println!("║  2. List Messages                  ║");
    println!("║  3. Check Webhook                  ║");
    println!("║  4. Set Webhook                    ║");
    println!("║  5. Gateway Diagnostics            ║");
    println!("║  0. Exit                           ║");
    println!("╚════════════════════════════════════╝");
}

fn handle_event(event: WorkerEvent) {
    match event {
        WorkerEvent::MessageSent { id, to, stored } => {
            let note = if stored { "" } else { " (not logged)" };
            println!("\n📤 Sent {} to {}{}", id, to, note);
        }
        WorkerEvent::MessagesReceived { count, total } => {
            println!("\n💬 Stored {} inbound messages ({} total)", count, total);
        }
        WorkerEvent::StoreFailed { error } => {
            println!("\n❌ Message log write failed: {}", error);
        }
    }
}

fn print_error(err: &WorkerError) {
    match err {
        WorkerError::Validation(e) => println!("⚠️  {}", e),
        WorkerError::Upstream { status, message } => println!("❌ Gateway [{}]: {}", status, message),
        other => println!("❌ {}", other),
    }
}

async fn send_message(worker: &CourierWorker) -> std::result::Result<(), WorkerError> {
    let request = SendMessageRequest {
        phone: prompt("To (phone number): "),
        message: prompt("Message: "),
    };

    let outcome = worker.send_message(&request).await?;
    println!("✅ Gateway answered {}", outcome.reply.status);
    Ok(())
}

async fn list_messages(worker: &CourierWorker) -> std::result::Result<(), WorkerError> {
    let log = worker.list_messages().await?;

    if log.is_empty() {
        println!("📭 No messages stored");
        return Ok(());
    }

    println!("\n💬 Messages ({}):", log.len());
    let skip = log.len().saturating_sub(20);
    for msg in log.messages.iter().skip(skip) {
        println!("  {}", format_record(msg));
    }
    if skip > 0 {
        println!("  ... {} older messages not shown", skip);
    }
    Ok(())
}

async fn check_webhook(worker: &CourierWorker) -> std::result::Result<(), WorkerError> {
    let reply = worker.webhook().await?;
    println!("🔗 [{}] {}", reply.status, reply.body_text());
    Ok(())
}

async fn set_webhook(worker: &CourierWorker) -> std::result::Result<(), WorkerError> {
    let request = WebhookUrlRequest {
        url: prompt("Webhook URL: "),
    };

    let reply = worker.setup_webhook(&request).await?;
    println!("✅ Webhook configured: {}", reply.body_text());
    Ok(())
}

async fn diagnostics(worker: &CourierWorker) -> std::result::Result<(), WorkerError> {
    let report = worker.diagnostics().await?;
    println!("\n🩺 Gateway diagnostics:");
    println!("  channels: {}", report.channels_status);
    println!("  contacts: {}", report.contacts_status);
    println!("  messages: {}", report.messages_status);
    if let Some(data) = report.messages_data {
        let pretty = serde_json::to_string_pretty(&data).unwrap_or_default();
        println!("{}", pretty);
    }
    Ok(())
}

fn format_record(msg: &MessageRecord) -> String {
    let direction = match msg.direction() {
        Direction::Outgoing => "→",
        Direction::Incoming => "←",
    };
    let text = if msg.text().is_empty() { "[no text]" } else { msg.text() };
    format!("{} [{}] {}: {}", direction, msg.timestamp(), msg.counterpart(), text)
}

fn prompt(label: &str) -> Option<String> {
    read_line(label).ok().flatten().filter(|s| !s.is_empty())
}

/// Prompts and reads one line. `None` once stdin is closed.
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    Ok(next_line(&mut io::stdin().lock())?)
}

fn next_line(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
