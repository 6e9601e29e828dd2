use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use client_core::{
    auth::{login_form, LoginField, SignupDraft, SignupStep, SignupWizard, StepOutcome},
    catalog::{ApiEndpoints, CatalogScreen, ImageUrls},
    config::{load_settings, prepare_scratch_pad_url, ClientSettings},
    detail::MovieDetailScreen,
    form::{submit_fn, FieldErrors, FieldValues, FormFields, SubmitOutcome},
    transport::{HttpFetcher, ResourceFetcher},
    wizard::CompletionHandler,
};
use futures::FutureExt;
use shared::domain::{MovieId, Page};
use storage::{ScratchPad, SqliteScratchPad};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List one page of a catalog category.
    Browse {
        #[arg(long, default_value = "popular")]
        category: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show a movie with its directors and leading cast.
    Detail { movie_id: String },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
        #[arg(long)]
        nickname: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();
    let settings = load_settings();

    match cli.command {
        Command::Browse { category, page } => browse(&settings, &category, page).await,
        Command::Detail { movie_id } => detail(&settings, &movie_id).await,
        Command::Login { email, password } => login(&settings, email, password).await,
        Command::Signup {
            email,
            password,
            confirm,
            nickname,
        } => signup(&settings, [email, password, confirm, nickname]).await,
    }
}

fn fetcher(settings: &ClientSettings) -> Arc<dyn ResourceFetcher> {
    if settings.api_token.is_empty() {
        warn!("no API token configured; set TMDB_API_TOKEN or APP__API_TOKEN");
    }
    Arc::new(HttpFetcher::new(settings.api_token.clone()))
}

async fn browse(settings: &ClientSettings, category: &str, page: u32) -> Result<()> {
    let mut screen = CatalogScreen::new(ApiEndpoints::from_settings(settings)?, fetcher(settings));
    let images = ImageUrls::from_settings(settings)?;

    screen.navigate_to_page(Some(category), Page::new(page));
    let state = screen.settled().await;
    if let Some(message) = state.error {
        bail!(message);
    }
    let listing = state
        .data
        .ok_or_else(|| anyhow!("listing finished without data"))?;

    println!(
        "{} - page {} of {} ({} movies)",
        screen.category(),
        listing.page,
        listing.total_pages,
        listing.total_results
    );
    for movie in &listing.results {
        let poster = images
            .poster(movie.poster_path.as_deref())
            .map(|url| url.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:>8}  {}  [{}]", movie.id, movie.title, poster);
    }
    Ok(())
}

async fn detail(settings: &ClientSettings, movie_id: &str) -> Result<()> {
    let Some(movie_id) = MovieId::from_route(Some(movie_id)) else {
        bail!("movie id must not be blank");
    };
    let mut screen = MovieDetailScreen::new(ApiEndpoints::from_settings(settings)?, fetcher(settings));
    let images = ImageUrls::from_settings(settings)?;

    screen.show(Some(movie_id));
    screen.settled().await;
    if let Some(message) = screen.error() {
        bail!(message);
    }
    let view = screen
        .view()
        .ok_or_else(|| anyhow!("movie detail finished without data"))?;

    let movie = &view.movie;
    println!("{} ({})", movie.title, movie.release_date);
    if let Some(runtime) = movie.runtime {
        println!("runtime: {runtime} min");
    }
    let genres: Vec<&str> = movie.genres.iter().map(|genre| genre.name.as_str()).collect();
    println!("genres: {}", genres.join(", "));
    if let Some(backdrop) = images.backdrop(movie.backdrop_path.as_deref()) {
        println!("backdrop: {backdrop}");
    }
    let directors: Vec<&str> = view.directors.iter().map(|crew| crew.name.as_str()).collect();
    println!("directed by: {}", directors.join(", "));
    for member in &view.main_cast {
        println!("  {} as {}", member.name, member.character);
    }
    println!();
    println!("{}", movie.overview);
    Ok(())
}

async fn login(settings: &ClientSettings, email: String, password: String) -> Result<()> {
    let form = login_form(settings.locale(), submit_fn(|values: FieldValues<LoginField>| {
        async move {
            info!(email = %values.get(LoginField::Email), "login submitted");
            Ok::<_, anyhow::Error>(())
        }
        .boxed()
    }));
    form.on_field_change(LoginField::Email, email);
    form.on_field_change(LoginField::Password, password);

    match form.on_submit().await {
        SubmitOutcome::Submitted => Ok(()),
        SubmitOutcome::Invalid(errors) => {
            report_field_errors(&errors);
            bail!("login form is invalid")
        }
        SubmitOutcome::Failed(err) => Err(err),
    }
}

fn report_field_errors<F: FormFields>(errors: &FieldErrors<F>) {
    for (field, message) in errors.iter() {
        error!(field = field.name(), "{message}");
    }
}

struct LogSignup;

#[async_trait]
impl CompletionHandler<SignupDraft> for LogSignup {
    async fn complete(&self, draft: SignupDraft) -> Result<()> {
        info!(?draft, "signup completed");
        Ok(())
    }
}

/// Walks the wizard non-interactively, feeding each step its fields in order.
async fn signup(settings: &ClientSettings, values: [String; 4]) -> Result<()> {
    let database_url = prepare_scratch_pad_url(&settings.scratch_pad_url);
    let scratch = SqliteScratchPad::open(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open scratch pad; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    scratch.health_check().await?;
    let scratch: Arc<dyn ScratchPad> = Arc::new(scratch);
    let mut wizard = SignupWizard::with_locale(settings.locale(), scratch, Arc::new(LogSignup));

    let [email, password, confirm, nickname] = values;
    let steps = [
        vec![("email", email)],
        vec![("password", password), ("confirm", confirm)],
        vec![("nickname", nickname)],
    ];
    for fields in steps {
        for (name, value) in fields {
            wizard.set_field(name, value)?;
        }
        match wizard.submit_current_step().await? {
            StepOutcome::Advanced(step) => info!(?step, "signup step accepted"),
            StepOutcome::Completed => return Ok(()),
            StepOutcome::Invalid => {
                match wizard.current_step() {
                    Some(SignupStep::Email) => report_field_errors(&wizard.email_form().errors()),
                    Some(SignupStep::Password) => {
                        report_field_errors(&wizard.password_form().errors())
                    }
                    Some(SignupStep::Nickname) => {
                        report_field_errors(&wizard.nickname_form().errors())
                    }
                    None => {}
                }
                bail!("signup step {:?} is invalid", wizard.current_step())
            }
            StepOutcome::Failed(err) => return Err(err),
        }
    }
    bail!("signup wizard did not complete")
}
