//! Mock implementations of adapter traits for testing

use crate::cli::adapters::{
    ApiClient, AsyncResource, Backup, CatalogTranslator, Clock, CloudAccountEndpoint,
    ConsoleOutput, Endpoint, EndpointName, ListFilter, Prompter, RemoteState, Resource,
    ResourceCollection,
};
use crate::cli::commands;
use crate::cli::console::Console;
use crate::cli::declarative::builder::CommandBuilder;
use crate::cli::error::{CliError, CliResult};
use crate::cli::executor::{CommandExecutor, ExecutionContext};
use crate::cli::poller::{PollSettings, Timeout};
use crate::cli::summary::SummaryFormatter;
use crate::config::Configuration;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Resource backed by a JSON object
#[derive(Debug, Clone)]
pub struct MockResource {
    value: Value,
}

impl MockResource {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Resource for MockResource {
    fn id(&self) -> Option<i64> {
        self.value.get("id").and_then(Value::as_i64)
    }

    fn get(&self, field: &str) -> Option<Value> {
        self.value.get(field).cloned()
    }

    fn to_value(&self, _deep: bool) -> Value {
        self.value.clone()
    }
}

#[derive(Debug, Default)]
struct BackupScript {
    refreshes: usize,
    complete_after: Option<usize>,
    fail_after: Option<(usize, String)>,
}

/// Scripted backup; clones share refresh state and recorded downloads
#[derive(Debug, Clone)]
pub struct MockBackup {
    fields: Value,
    script: Arc<Mutex<BackupScript>>,
    downloads: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockBackup {
    /// Completes on the first refresh unless scripted otherwise
    pub fn new(cloud_account_id: i64, filename: &str) -> Self {
        Self {
            fields: json!({
                "filename": filename,
                "cloud_account_id": cloud_account_id,
                "filesize": 1_048_576,
                "filedate": 1_699_963_200,
            }),
            script: Arc::new(Mutex::new(BackupScript {
                complete_after: Some(1),
                ..Default::default()
            })),
            downloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Override one reported field
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        if let Some(map) = self.fields.as_object_mut() {
            map.insert(key.to_string(), value);
        }
        self
    }

    pub fn complete_after(self, refreshes: usize) -> Self {
        self.script.lock().unwrap().complete_after = Some(refreshes);
        self
    }

    pub fn never_complete(self) -> Self {
        self.script.lock().unwrap().complete_after = None;
        self
    }

    pub fn fail_after(self, refreshes: usize, reason: &str) -> Self {
        self.script.lock().unwrap().fail_after = Some((refreshes, reason.to_string()));
        self
    }

    pub fn refresh_counter(&self) -> RefreshCounter {
        RefreshCounter(Arc::clone(&self.script))
    }

    /// Directories passed to `download`
    pub fn downloads(&self) -> Vec<PathBuf> {
        self.downloads.lock().unwrap().clone()
    }
}

/// Number of refreshes a `MockBackup` has seen
pub struct RefreshCounter(Arc<Mutex<BackupScript>>);

impl RefreshCounter {
    pub fn get(&self) -> usize {
        self.0.lock().unwrap().refreshes
    }
}

impl Resource for MockBackup {
    fn id(&self) -> Option<i64> {
        None
    }

    fn get(&self, field: &str) -> Option<Value> {
        self.to_value(false).get(field).cloned()
    }

    fn to_value(&self, _deep: bool) -> Value {
        let mut value = self.fields.clone();
        if let Some(map) = value.as_object_mut() {
            map.insert(
                "complete".to_string(),
                Value::Bool(self.state() == RemoteState::Complete),
            );
        }
        value
    }
}

impl AsyncResource for MockBackup {
    fn refresh(&mut self) -> CliResult<()> {
        self.script.lock().unwrap().refreshes += 1;
        Ok(())
    }

    fn state(&self) -> RemoteState {
        let script = self.script.lock().unwrap();
        if let Some((after, reason)) = &script.fail_after {
            if script.refreshes >= *after {
                return RemoteState::Failed(reason.clone());
            }
        }
        match script.complete_after {
            Some(after) if script.refreshes >= after => RemoteState::Complete,
            _ => RemoteState::Pending,
        }
    }
}

impl Backup for MockBackup {
    fn filename(&self) -> String {
        self.fields["filename"].as_str().unwrap_or_default().to_string()
    }

    fn cloud_account_id(&self) -> i64 {
        self.fields["cloud_account_id"].as_i64().unwrap_or_default()
    }

    fn download(&self, dir: &Path) -> CliResult<PathBuf> {
        self.downloads.lock().unwrap().push(dir.to_path_buf());
        Ok(dir.join(self.filename()))
    }
}

/// Endpoint over a fixed list of JSON items
#[derive(Debug, Clone)]
pub struct MockEndpoint {
    name: EndpointName,
    items: Arc<Vec<Value>>,
    lists: Arc<Mutex<Vec<ListFilter>>>,
    created: Arc<Mutex<Vec<Map<String, Value>>>>,
    create_template: Option<Value>,
}

impl MockEndpoint {
    pub fn new(name: EndpointName, items: Vec<Value>) -> Self {
        Self {
            name,
            items: Arc::new(items),
            lists: Arc::new(Mutex::new(Vec::new())),
            created: Arc::new(Mutex::new(Vec::new())),
            create_template: None,
        }
    }

    /// Allow `create`; the result is `template` overlaid with the fields
    pub fn with_create_template(mut self, template: Value) -> Self {
        self.create_template = Some(template);
        self
    }

    /// Filter of the most recent `list` call
    pub fn last_filter(&self) -> ListFilter {
        self.lists.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn list_calls(&self) -> usize {
        self.lists.lock().unwrap().len()
    }

    /// Field maps passed to `create`
    pub fn created(&self) -> Vec<Map<String, Value>> {
        self.created.lock().unwrap().clone()
    }
}

fn matches_filter(item: &Value, filter: &ListFilter) -> bool {
    filter.iter().all(|(key, expected)| match item.get(key) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}

impl Endpoint for MockEndpoint {
    fn name(&self) -> EndpointName {
        self.name
    }

    fn retrieve(&self, id: i64) -> CliResult<Box<dyn Resource>> {
        self.items
            .iter()
            .find(|item| item.get("id").and_then(Value::as_i64) == Some(id))
            .map(|item| Box::new(MockResource::new(item.clone())) as Box<dyn Resource>)
            .ok_or_else(|| CliError::RemoteOperation(format!("{} {} not found", self.name, id)))
    }

    fn list(&self, filter: &ListFilter) -> CliResult<ResourceCollection> {
        self.lists.lock().unwrap().push(filter.clone());
        let items = self
            .items
            .iter()
            .filter(|item| matches_filter(item, filter))
            .map(|item| Box::new(MockResource::new(item.clone())) as Box<dyn Resource>)
            .collect();
        Ok(ResourceCollection::new(items))
    }

    fn create(&self, fields: &Map<String, Value>) -> CliResult<Box<dyn Resource>> {
        let Some(template) = &self.create_template else {
            return Err(CliError::Unsupported(format!(
                "{} endpoint cannot create resources",
                self.name
            )));
        };
        self.created.lock().unwrap().push(fields.clone());

        let mut value = template.clone();
        if let Some(map) = value.as_object_mut() {
            for (key, field) in fields {
                map.insert(key.clone(), field.clone());
            }
        }
        Ok(Box::new(MockResource::new(value)))
    }
}

/// Cloud account endpoint with scripted backups
#[derive(Debug, Clone)]
pub struct MockCloudAccountEndpoint {
    pub endpoint: MockEndpoint,
    backups: Arc<Mutex<Vec<MockBackup>>>,
    next_backup: Arc<Mutex<Option<MockBackup>>>,
    created_backups: Arc<Mutex<Vec<i64>>>,
}

impl MockCloudAccountEndpoint {
    pub fn new(endpoint: MockEndpoint) -> Self {
        Self {
            endpoint,
            backups: Arc::new(Mutex::new(Vec::new())),
            next_backup: Arc::new(Mutex::new(None)),
            created_backups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add an existing backup
    pub fn with_backup(self, backup: MockBackup) -> Self {
        self.add_backup(backup);
        self
    }

    pub fn add_backup(&self, backup: MockBackup) {
        self.backups.lock().unwrap().push(backup);
    }

    /// Backup returned by the next `create_backup` call
    pub fn will_create(&self, backup: MockBackup) {
        *self.next_backup.lock().unwrap() = Some(backup);
    }

    /// Cloud account ids passed to `create_backup`
    pub fn created_backups(&self) -> Vec<i64> {
        self.created_backups.lock().unwrap().clone()
    }

    pub fn backup(&self, filename: &str) -> Option<MockBackup> {
        self.backups
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.filename() == filename)
            .cloned()
    }
}

impl Endpoint for MockCloudAccountEndpoint {
    fn name(&self) -> EndpointName {
        self.endpoint.name()
    }

    fn retrieve(&self, id: i64) -> CliResult<Box<dyn Resource>> {
        self.endpoint.retrieve(id)
    }

    fn list(&self, filter: &ListFilter) -> CliResult<ResourceCollection> {
        self.endpoint.list(filter)
    }

    fn create(&self, fields: &Map<String, Value>) -> CliResult<Box<dyn Resource>> {
        self.endpoint.create(fields)
    }
}

impl CloudAccountEndpoint for MockCloudAccountEndpoint {
    fn create_backup(&self, cloud_account_id: i64) -> CliResult<Box<dyn Backup>> {
        self.endpoint.retrieve(cloud_account_id)?;
        let backup = self
            .next_backup
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| {
                MockBackup::new(cloud_account_id, &format!("backup-{}.tgz", cloud_account_id))
            });
        self.created_backups.lock().unwrap().push(cloud_account_id);
        self.backups.lock().unwrap().push(backup.clone());
        Ok(Box::new(backup))
    }

    fn backups(&self, cloud_account_id: i64) -> CliResult<Vec<Box<dyn Backup>>> {
        Ok(self
            .backups
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.cloud_account_id() == cloud_account_id)
            .map(|b| Box::new(b.clone()) as Box<dyn Backup>)
            .collect())
    }
}

/// API client over mock endpoints
#[derive(Debug, Clone)]
pub struct MockApiClient {
    pub accounts: MockCloudAccountEndpoint,
    pub apps: MockEndpoint,
    pub clouds: MockEndpoint,
    pub packages: MockEndpoint,
}

impl MockApiClient {
    /// Two cloud accounts (42 with one finished backup), three apps, two
    /// active clouds plus a retired one, and one cloud package
    pub fn fixture() -> Self {
        let accounts = MockEndpoint::new(
            EndpointName::CloudAccount,
            vec![
                json!({"id": 42, "domain": "example.com", "state": "stable"}),
                json!({"id": 43, "domain": "shop.example.org", "state": "stable"}),
            ],
        )
        .with_create_template(json!({
            "id": 99,
            "state": "provisioning",
            "temp_domain": "tmp99.nxcli.net",
            "app": {"id": 1, "identity": "WordPress"},
            "location": {"identity": "US Midwest"},
            "service": {"description": "Cloud Starter", "status": "enabled"},
        }));

        Self {
            accounts: MockCloudAccountEndpoint::new(accounts)
                .with_backup(MockBackup::new(42, "backup-2023-11-14.tgz").complete_after(0)),
            apps: MockEndpoint::new(
                EndpointName::App,
                vec![
                    json!({"id": 1, "name": "WordPress"}),
                    json!({"id": 2, "name": "Flexible PHP"}),
                    json!({"id": 3, "name": "Drupal"}),
                ],
            ),
            clouds: MockEndpoint::new(
                EndpointName::Cloud,
                vec![
                    json!({
                        "id": 11,
                        "location": "US Midwest",
                        "location_code": "us-midwest-1",
                        "status": "active",
                    }),
                    json!({
                        "id": 12,
                        "location": "Tokyo",
                        "location_code": "ap-northeast-1",
                        "status": "active",
                    }),
                    json!({
                        "id": 13,
                        "location": "Old DC",
                        "location_code": "old-1",
                        "status": "retired",
                    }),
                ],
            ),
            packages: MockEndpoint::new(
                EndpointName::Package,
                vec![
                    json!({"id": 21, "name": "Cloud Starter", "type": "virt-guest-cloud"}),
                    json!({"id": 22, "name": "Dedicated", "type": "dedicated"}),
                ],
            ),
        }
    }
}

impl ApiClient for MockApiClient {
    fn endpoint(&self, name: EndpointName) -> CliResult<&dyn Endpoint> {
        Ok(match name {
            EndpointName::App => &self.apps,
            EndpointName::Cloud => &self.clouds,
            EndpointName::CloudAccount => &self.accounts,
            EndpointName::Package => &self.packages,
        })
    }

    fn cloud_accounts(&self) -> CliResult<&dyn CloudAccountEndpoint> {
        Ok(&self.accounts)
    }
}

/// Records everything said; clones share the buffers
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    stdout: Arc<Mutex<Vec<String>>>,
    stderr: Arc<Mutex<Vec<String>>>,
    json: Arc<Mutex<Vec<Value>>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout(&self) -> Vec<String> {
        self.stdout.lock().unwrap().clone()
    }

    pub fn stderr(&self) -> Vec<String> {
        self.stderr.lock().unwrap().clone()
    }

    pub fn json(&self) -> Vec<Value> {
        self.json.lock().unwrap().clone()
    }
}

impl ConsoleOutput for RecordingOutput {
    fn say(&self, text: &str) {
        self.stdout.lock().unwrap().push(text.to_string());
    }

    fn say_err(&self, text: &str) {
        self.stderr.lock().unwrap().push(text.to_string());
    }

    /// Rendered the way the terminal does it, then decoded again
    fn say_json(&self, value: &Value) -> CliResult<()> {
        let rendered = SummaryFormatter::default().format_json(value)?;
        self.json.lock().unwrap().push(serde_json::from_str(&rendered)?);
        Ok(())
    }
}

/// Prompter answering from queues
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    interactive: bool,
    selections: Arc<Mutex<VecDeque<usize>>>,
    answers: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<usize>>,
}

impl ScriptedPrompter {
    pub fn non_interactive() -> Self {
        Self::default()
    }

    /// Interactive; menus pick these indexes in order
    pub fn with_selections(selections: Vec<usize>) -> Self {
        Self {
            interactive: true,
            selections: Arc::new(Mutex::new(selections.into())),
            ..Default::default()
        }
    }

    /// Free-form answers, in order
    pub fn with_answers<S: Into<String>>(mut self, answers: Vec<S>) -> Self {
        self.interactive = true;
        self.answers = Arc::new(Mutex::new(answers.into_iter().map(Into::into).collect()));
        self
    }

    /// Number of menus and questions shown
    pub fn prompts(&self) -> usize {
        *self.prompts.lock().unwrap()
    }
}

impl Prompter for ScriptedPrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn select(&self, prompt: &str, _items: &[String]) -> CliResult<usize> {
        *self.prompts.lock().unwrap() += 1;
        self.selections
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CliError::Prompt(format!("no scripted selection for '{}'", prompt)))
    }

    fn ask(&self, prompt: &str) -> CliResult<String> {
        *self.prompts.lock().unwrap() += 1;
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CliError::Prompt(format!("no scripted answer for '{}'", prompt)))
    }
}

/// Clock that advances only when slept on
#[derive(Debug, Clone)]
pub struct ManualClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Run a console over `api` with the built-in phrases, returning what it said
pub fn run_with(
    api: MockApiClient,
    prompter: ScriptedPrompter,
    args: &[&str],
) -> (CliResult<u8>, RecordingOutput) {
    let output = RecordingOutput::new();
    let mut console = Console::new(Configuration::default(), api)
        .with_translator(CatalogTranslator::builtin())
        .with_output(output.clone())
        .with_prompter(prompter)
        .with_clock(ManualClock::new())
        .with_styling(false);

    let result = console.register_defaults().and_then(|_| {
        console.run_from(std::iter::once("nexcess-cli").chain(args.iter().copied()))
    });
    (result, output)
}

/// `run_with` over the fixture API without interaction
pub fn run_fixture(args: &[&str]) -> CliResult<RecordingOutput> {
    let (result, output) = run_with(
        MockApiClient::fixture(),
        ScriptedPrompter::non_interactive(),
        args,
    );
    result.map(|_| output)
}

/// Call `f` with an executor for the named default command over the
/// fixture API and an empty phrase catalog
pub fn fixture_executor<F>(name: &str, f: F)
where
    F: FnOnce(&CommandExecutor<'_>, &MockApiClient),
{
    let api = MockApiClient::fixture();
    let translator = CatalogTranslator::new();
    let output = RecordingOutput::new();
    let prompter = ScriptedPrompter::non_interactive();
    let clock = ManualClock::new();

    let definition = commands::find(name).expect("unknown default command");
    let registered = CommandBuilder::new(&translator)
        .register(definition)
        .expect("default command registers");
    let ctx = ExecutionContext {
        api: &api,
        translator: &translator,
        output: &output,
        prompter: &prompter,
        clock: &clock,
        poll: PollSettings::default(),
        timeout: Timeout::Unbounded,
        styled: false,
        log: None,
    };
    let exec = CommandExecutor::new(&registered, ctx);
    f(&exec, &api);
}
