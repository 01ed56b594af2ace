//! MMKGS - VirtualHome2KG Media Search CLI
//!
//! Command-line interface over the search core

use clap::{Parser, Subcommand};
use mmkg_search::{
    HttpEndpoint, MemoryEndpoint, SearchSession, SparqlEndpoint, VideoFilter, DEFAULT_ENDPOINT,
};

#[derive(Parser)]
#[command(name = "mmkgs")]
#[command(version)]
#[command(about = "Search the VirtualHome2KG multimedia knowledge graph", long_about = None)]
struct Cli {
    /// SPARQL endpoint URL
    #[arg(long, global = true, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Run against a local Turtle file instead of the remote endpoint
    #[arg(long, global = true)]
    turtle: Option<std::path::PathBuf>,

    /// Output format (table, json)
    #[arg(long, global = true, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the endpoint with an ASK query
    Check,
    /// List all action classes
    Actions,
    /// List all activities and their scenes
    Activities,
    /// Search camera recordings by action and objects
    Search {
        /// Action IRI or local action name (exact matching)
        action: String,
        /// Main object of the event (partial matching)
        main_object: String,
        /// Target object of the event (partial matching)
        #[arg(long, short = 't')]
        target_object: Option<String>,
        /// Camera identifier substring
        #[arg(long, short = 'c')]
        camera: Option<String>,
        /// Result page (1-based)
        #[arg(long, default_value_t = 1)]
        page: u64,
    },
    /// List distinct cameras matching a search
    Cameras {
        action: String,
        main_object: String,
        #[arg(long, short = 't')]
        target_object: Option<String>,
        #[arg(long, short = 'c')]
        camera: Option<String>,
    },
    /// List video segments (with frame bounds) matching a search
    Segments {
        action: String,
        main_object: String,
        #[arg(long, short = 't')]
        target_object: Option<String>,
        #[arg(long, short = 'c')]
        camera: Option<String>,
    },
    /// List all media segments of one camera recording
    MediaSegments {
        activity: String,
        scene: String,
        camera: String,
    },
    /// Show frame rate and media reference of one camera recording
    Recording {
        activity: String,
        scene: String,
        camera: String,
    },
    /// List split-image frames of a media segment
    Images {
        segment: String,
        /// Lowest frame number to include
        #[arg(long)]
        start: Option<u64>,
        /// Highest frame number to include
        #[arg(long)]
        end: Option<u64>,
    },
    /// List 2D bounding-box annotations of a media segment
    Bboxes {
        segment: String,
        /// Main object of the event (partial matching)
        main_object: String,
        /// Target object of the event (partial matching)
        #[arg(long, short = 't')]
        target_object: Option<String>,
    },
    /// List frames of a segment where the searched object is annotated
    ObjectFrames {
        segment: String,
        main_object: String,
        #[arg(long, short = 't')]
        target_object: Option<String>,
    },
    /// Show the action annotation of a video segment
    SegmentActions {
        segment: String,
        /// Scene identifier, stripped from object instance names
        scene: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = match cli.format.as_str() {
        "table" => false,
        "json" => true,
        other => anyhow::bail!("unknown format '{}' (expected table or json)", other),
    };

    match &cli.turtle {
        Some(path) => {
            let turtle = std::fs::read_to_string(path)?;
            let session = SearchSession::new(MemoryEndpoint::from_turtle(&turtle)?);
            run(&session, cli.command, json).await
        }
        None => {
            let session = SearchSession::new(HttpEndpoint::new(&cli.endpoint)?);
            run(&session, cli.command, json).await
        }
    }
}

async fn run<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    command: Commands,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Check => handle_check(session).await,
        Commands::Actions => handle_actions(session, json).await,
        Commands::Activities => handle_activities(session, json).await,
        Commands::Search {
            action,
            main_object,
            target_object,
            camera,
            page,
        } => {
            let filter = build_filter(&action, &main_object, target_object, camera)?;
            handle_search(session, &filter, page, json).await
        }
        Commands::Cameras {
            action,
            main_object,
            target_object,
            camera,
        } => {
            let filter = build_filter(&action, &main_object, target_object, camera)?;
            handle_cameras(session, &filter, json).await
        }
        Commands::Segments {
            action,
            main_object,
            target_object,
            camera,
        } => {
            let filter = build_filter(&action, &main_object, target_object, camera)?;
            handle_segments(session, &filter, json).await
        }
        Commands::MediaSegments {
            activity,
            scene,
            camera,
        } => handle_media_segments(session, &activity, &scene, &camera, json).await,
        Commands::Recording {
            activity,
            scene,
            camera,
        } => handle_recording(session, &activity, &scene, &camera, json).await,
        Commands::Images {
            segment,
            start,
            end,
        } => handle_images(session, &segment, start, end, json).await,
        Commands::Bboxes {
            segment,
            main_object,
            target_object,
        } => handle_bboxes(session, &segment, &main_object, target_object.as_deref(), json).await,
        Commands::ObjectFrames {
            segment,
            main_object,
            target_object,
        } => {
            handle_object_frames(session, &segment, &main_object, target_object.as_deref(), json)
                .await
        }
        Commands::SegmentActions { segment, scene } => {
            handle_segment_actions(session, &segment, &scene, json).await
        }
    }
}

/// Accept either a full action IRI or a bare local name like `grab`.
fn build_filter(
    action: &str,
    main_object: &str,
    target_object: Option<String>,
    camera: Option<String>,
) -> anyhow::Result<VideoFilter> {
    let action_iri = if action.starts_with("http://") || action.starts_with("https://") {
        action.to_string()
    } else {
        format!("{}{}", mmkg_search::sparql::PREFIX_ACTION, action)
    };
    let mut filter = VideoFilter::new(action_iri, main_object)?;
    if let Some(target) = target_object {
        filter = filter.with_target_object(target);
    }
    if let Some(camera) = camera {
        filter = filter.with_camera(camera);
    }
    Ok(filter)
}

async fn handle_check<E: SparqlEndpoint>(
    session: &SearchSession<E>,
) -> anyhow::Result<()> {
    match session.probe().await {
        Ok(true) => {
            println!("✓ Endpoint reachable");
            Ok(())
        }
        Ok(false) => {
            eprintln!("Endpoint answered the probe with false");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Check that the RDF database container is running.");
            std::process::exit(1);
        }
    }
}

async fn handle_actions<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    json: bool,
) -> anyhow::Result<()> {
    let actions = session.fetch_actions().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&actions)?);
        return Ok(());
    }
    if actions.is_empty() {
        println!("No actions found.");
        return Ok(());
    }
    println!("{:<24} {}", "ACTION", "IRI");
    println!("{}", "-".repeat(80));
    for action in &actions {
        println!("{:<24} {}", action.label, action.iri);
    }
    println!("\nTotal: {} action(s)", actions.len());
    Ok(())
}

async fn handle_activities<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    json: bool,
) -> anyhow::Result<()> {
    let activities = session.fetch_activities().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&activities)?);
        return Ok(());
    }
    if activities.is_empty() {
        println!("No activities found.");
        return Ok(());
    }
    for activity in &activities {
        println!("{}", activity.name);
        for scene in &activity.scenes {
            println!("  {}", scene);
        }
    }
    println!("\nTotal: {} activit(ies)", activities.len());
    Ok(())
}

async fn handle_search<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    filter: &VideoFilter,
    page: u64,
    json: bool,
) -> anyhow::Result<()> {
    let Some(result) = session.search_videos(filter, page).await? else {
        anyhow::bail!("search was superseded before completion");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    if result.records.is_empty() {
        println!("No videos found.");
        return Ok(());
    }
    println!(
        "Page {}/{} ({} video(s) total)\n",
        result.page, result.page_count, result.total
    );
    println!("{:<48} {}", "CAMERA", "MEDIA");
    println!("{}", "-".repeat(64));
    for record in &result.records {
        println!(
            "{:<48} base64 ({} chars)",
            record.camera,
            record.base64_video.len()
        );
    }
    Ok(())
}

async fn handle_cameras<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    filter: &VideoFilter,
    json: bool,
) -> anyhow::Result<()> {
    let cameras = session.cameras(filter).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&cameras)?);
        return Ok(());
    }
    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }
    for camera in &cameras {
        println!("{}", camera);
    }
    println!("\nTotal: {} camera(s)", cameras.len());
    Ok(())
}

async fn handle_segments<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    filter: &VideoFilter,
    json: bool,
) -> anyhow::Result<()> {
    let segments = session.video_segments(filter).await?;
    print_segments(&segments, json)
}

async fn handle_media_segments<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    activity: &str,
    scene: &str,
    camera: &str,
    json: bool,
) -> anyhow::Result<()> {
    let segments = session.media_segments(activity, scene, camera).await?;
    print_segments(&segments, json)
}

fn print_segments(
    segments: &[mmkg_search::FrameSpan],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
        return Ok(());
    }
    if segments.is_empty() {
        println!("No segments found.");
        return Ok(());
    }
    println!("{:<48} {:>10} {:>10}", "SEGMENT", "START", "END");
    println!("{}", "-".repeat(70));
    for span in segments {
        println!(
            "{:<48} {:>10} {:>10}",
            span.segment, span.start_frame, span.end_frame
        );
    }
    println!("\nTotal: {} segment(s)", segments.len());
    Ok(())
}

async fn handle_recording<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    activity: &str,
    scene: &str,
    camera: &str,
    json: bool,
) -> anyhow::Result<()> {
    let recording = session.recording(activity, scene, camera).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recording)?);
        return Ok(());
    }
    println!("Recording: {}_{}_{}", activity, scene, camera);
    println!("  Frame rate: {}", recording.frame_rate);
    println!("  Media: base64 ({} chars)", recording.video.len());
    Ok(())
}

async fn handle_images<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    segment: &str,
    start: Option<u64>,
    end: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let frames = session.segment_images(segment, start, end).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&frames)?);
        return Ok(());
    }
    if frames.is_empty() {
        println!("No image frames found.");
        return Ok(());
    }
    println!("{:<48} {:>8} {:>8} {:>8}", "DESCRIPTOR", "FRAME", "WIDTH", "TILES");
    println!("{}", "-".repeat(76));
    for frame in &frames {
        println!(
            "{:<48} {:>8} {:>8} {:>8}",
            frame.descriptor,
            frame.frame_number,
            frame.split_width,
            frame.images.len()
        );
    }
    println!("\nTotal: {} frame(s)", frames.len());
    Ok(())
}

async fn handle_bboxes<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    segment: &str,
    main_object: &str,
    target_object: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let annotations = session
        .bbox_annotations(segment, main_object, target_object)
        .await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&annotations)?);
        return Ok(());
    }
    if annotations.is_empty() {
        println!("No bounding-box annotations found.");
        return Ok(());
    }
    println!("{:<8} {:<40} {}", "FRAME", "OBJECT", "BBOX");
    println!("{}", "-".repeat(76));
    for annotation in &annotations {
        println!(
            "{:<8} {:<40} {}",
            annotation.frame_number, annotation.object, annotation.bbox
        );
    }
    println!("\nTotal: {} annotation(s)", annotations.len());
    Ok(())
}

async fn handle_object_frames<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    segment: &str,
    main_object: &str,
    target_object: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let frames = session
        .object_frames(segment, main_object, target_object)
        .await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&frames)?);
        return Ok(());
    }
    if frames.is_empty() {
        println!("No annotated frames found.");
        return Ok(());
    }
    for frame in &frames {
        println!("{}", frame);
    }
    println!("\nTotal: {} frame(s)", frames.len());
    Ok(())
}

async fn handle_segment_actions<E: SparqlEndpoint>(
    session: &SearchSession<E>,
    segment: &str,
    scene: &str,
    json: bool,
) -> anyhow::Result<()> {
    let actions = session.segment_actions(segment, scene).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&actions)?);
        return Ok(());
    }
    if actions.is_empty() {
        println!("No action annotations found.");
        return Ok(());
    }
    println!("{:<16} {:<24} {}", "ACTION", "MAIN OBJECT", "TARGET OBJECT");
    println!("{}", "-".repeat(64));
    for action in &actions {
        println!(
            "{:<16} {:<24} {}",
            action.action,
            action.main_object,
            action.target_object.as_deref().unwrap_or("-")
        );
    }
    println!("\nTotal: {} annotation(s)", actions.len());
    Ok(())
}
