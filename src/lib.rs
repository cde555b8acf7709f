pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod render;
pub mod service;
pub mod session;

pub use codec::{
    decode, encode, BitVec, CodeTable, Compressed, EncodedPayload, FrequencyTable, HuffmanTree,
    NodeId, TreeNode,
};
pub use config::ServiceConfig;
pub use error::{HuffmanError, Result};
pub use render::{export_pdf, render_png, tree_pdf, tree_png, PageGrid, TreeLayout};
pub use service::{
    DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, ExportedDocument,
    HuffmanService, VisualizeResponse,
};
pub use session::{Session, SessionStore};
