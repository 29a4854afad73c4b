use crate::{
    domain::{Board, BoardConfig},
    error::{LeadboardError, Result},
    storage::BoardStore,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage keeping the board as pretty JSON
pub struct FileStorage {
    root_path: PathBuf,
    config: BoardConfig,
}

impl FileStorage {
    const DATA_DIR: &'static str = ".leadboard";
    const BOARD_FILE: &'static str = "board.json";
    const CONFIG_FILE: &'static str = "config.json";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self::with_config(project_root, BoardConfig::default())
    }

    /// Uses `config` to seed the board when the storage is initialized
    pub fn with_config(project_root: impl AsRef<Path>, config: BoardConfig) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DATA_DIR),
            config,
        }
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    fn config_file(&self) -> PathBuf {
        self.root_path.join(Self::CONFIG_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Reads the stored board config, falling back to the one this
    /// storage was built with
    pub async fn load_config(&self) -> Result<BoardConfig> {
        let config_file = self.config_file();
        if !config_file.exists() {
            return Ok(self.config.clone());
        }

        let contents = fs::read_to_string(&config_file).await?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[async_trait]
impl BoardStore for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let config = self.load_config().await?;
        if !self.config_file().exists() {
            let json = serde_json::to_string_pretty(&config)?;
            fs::write(self.config_file(), json).await?;
        }

        if !self.board_file().exists() {
            let board = Board::new(config);
            self.save_board(&board).await?;
        }

        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(board)?;
        fs::write(self.board_file(), json).await?;

        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(LeadboardError::BoardNotInitialized);
        }

        let contents = fs::read_to_string(&board_file).await?;
        let board: Board = serde_json::from_str(&contents)?;

        Ok(board)
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.board_file().exists()
    }
}
