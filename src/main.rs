use std::io;
use std::process::ExitCode;

use contact_form::api::client::WebhookGateway;
use contact_form::app::Settings;
use contact_form::form::{FormController, Status};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("cv") => print_cv_layout(&args[1..]),
        Some("set-endpoint") => set_endpoint(&args[1..]),
        _ => run_contact_form(),
    }
}

fn run_contact_form() -> ExitCode {
    let settings = Settings::load();
    let gateway = match settings
        .endpoint_url()
        .map_err(|e| e.to_string())
        .and_then(|url| WebhookGateway::new(url, settings.timeout()).map_err(|e| e.to_string()))
    {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("Cannot set up contact form: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut form = FormController::new(gateway);
    let stdin = io::stdin();
    match contact_form::ui::console::run(&mut form, &mut stdin.lock(), &mut io::stdout()) {
        Ok(Status::Sent) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Console error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `cv <document> <pages> [container-width]`: prints which pages the renderer
/// should draw and at what width.
fn print_cv_layout(args: &[String]) -> ExitCode {
    let num_pages = args.get(1).map(|n| n.parse::<u32>());
    let (Some(document), Some(Ok(num_pages))) = (args.first(), num_pages) else {
        eprintln!("usage: contact-form cv <document> <pages> [container-width]");
        return ExitCode::FAILURE;
    };
    let mut pager = contact_form::cv::CvPager::new(document.as_str());
    pager.on_document_loaded(num_pages);
    if let Some(Ok(width)) = args.get(2).map(|w| w.parse::<u32>()) {
        pager.on_resize(width);
    }
    for page in pager.pages() {
        println!("{} page {} @ {}px", pager.document(), page.page_number, page.width);
    }
    ExitCode::SUCCESS
}

fn set_endpoint(args: &[String]) -> ExitCode {
    let Some(endpoint) = args.first() else {
        eprintln!("usage: contact-form set-endpoint <url>");
        return ExitCode::FAILURE;
    };
    let settings = Settings {
        endpoint: endpoint.clone(),
        ..Settings::load()
    };
    let saved = settings.endpoint_url().and_then(|url| {
        settings.save()?;
        Ok(url)
    });
    match saved {
        Ok(url) => {
            println!("Contact messages will be posted to {url}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to save settings: {e}");
            ExitCode::FAILURE
        }
    }
}
