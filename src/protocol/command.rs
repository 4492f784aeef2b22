#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    CatalogParse,
    CatalogRender,
    CatalogTemplate,
    CatalogQa,
    CatalogMerge,
    CatalogTr,
    CatalogLoad,
    DetectEncoding,
    AccountList,
    AccountCreate,
    AccountOpen,
    AccountSave,
    AccountUse,
    UserGet,
    UserList,
    StatusGet,
    AppPasswordGet,
    AppPasswordDelete,
    WipeCheck,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "catalog.parse" => Command::CatalogParse,
            "catalog.render" => Command::CatalogRender,
            "catalog.template" => Command::CatalogTemplate,
            "catalog.qa" => Command::CatalogQa,
            "catalog.merge" => Command::CatalogMerge,
            "catalog.tr" => Command::CatalogTr,
            "catalog.load" => Command::CatalogLoad,
            "encoding.detect" => Command::DetectEncoding,
            "account.list" => Command::AccountList,
            "account.create" => Command::AccountCreate,
            "account.open" => Command::AccountOpen,
            "account.save" => Command::AccountSave,
            "account.use" => Command::AccountUse,
            "user.get" => Command::UserGet,
            "user.list" => Command::UserList,
            "status.get" => Command::StatusGet,
            "apppassword.get" => Command::AppPasswordGet,
            "apppassword.delete" => Command::AppPasswordDelete,
            "wipe.check" => Command::WipeCheck,
            _ => Command::Unknown,
        }
    }
}
